use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use poster_client::{NoPosterProvider, PosterProvider};
use server::{poster_provider, AppConfig, LazyRecommender, PosterCard, RecommendationService};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Qulu - "Because you watched" movie recommendations
#[derive(Parser)]
#[command(name = "qulu")]
#[command(about = "Content-based movie recommender over the TMDB 5000 dataset", long_about = None)]
struct Cli {
    /// Directory holding tmdb_5000_movies.csv and tmdb_5000_credits.csv
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Vocabulary size cap
    #[arg(long)]
    max_features: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to a title
    Recommend {
        /// Exact movie title
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Skip poster lookups
        #[arg(long)]
        no_posters: bool,
    },

    /// List known titles
    Titles {
        /// Case-insensitive substring to match
        #[arg(long)]
        filter: Option<String>,

        /// Maximum number of titles to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Time random title queries
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.qulu_data_dir = data_dir;
    }
    if let Some(max_features) = cli.max_features {
        config.qulu_max_features = max_features;
    }
    debug!("Effective config: {:?}", config);

    let posters: Arc<dyn PosterProvider> = match &cli.command {
        Commands::Recommend { no_posters: false, .. } => poster_provider(&config)?,
        _ => Arc::new(NoPosterProvider),
    };

    // Build the pipeline (this may take a moment)
    println!(
        "Loading TMDB dataset from {}...",
        config.qulu_data_dir.display()
    );
    let start = Instant::now();
    let recommender = LazyRecommender::new(
        config.qulu_data_dir.clone(),
        config.pipeline_config(),
        posters,
    )
    .with_top_k(config.qulu_top_k);
    let service = recommender
        .get()
        .await
        .context("Failed to build recommender")?;
    println!(
        "{} Indexed {} movies in {:?}",
        "✓".green(),
        service.state().len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend { title, limit, .. } => {
            handle_recommend(service, &title, limit.unwrap_or(service.top_k())).await
        }
        Commands::Titles { filter, limit } => handle_titles(service, filter.as_deref(), limit),
        Commands::Benchmark { requests } => handle_benchmark(service, requests),
    }
}

/// Handle the 'recommend' command
async fn handle_recommend(service: &RecommendationService, title: &str, limit: usize) -> Result<()> {
    let cards = service.recommend_with_posters_limit(title, limit).await;

    if cards.is_empty() {
        println!(
            "{} No recommendations found for '{}'",
            "!".yellow(),
            title
        );
        return Ok(());
    }

    print_shelf(title, &cards);
    Ok(())
}

/// Handle the 'titles' command
fn handle_titles(service: &RecommendationService, filter: Option<&str>, limit: usize) -> Result<()> {
    let matches = filter_titles(service.titles(), filter.unwrap_or(""));

    match filter {
        Some(filter) => println!(
            "{}",
            format!("Titles matching '{}' ({}):", filter, matches.len())
                .bold()
                .blue()
        ),
        None => println!(
            "{}",
            format!("Titles ({}):", matches.len()).bold().blue()
        ),
    }
    for title in matches.iter().take(limit) {
        println!("{}{}", "• ".green(), title);
    }
    if matches.len() > limit {
        println!("  ... and {} more", matches.len() - limit);
    }
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(service: &RecommendationService, requests: usize) -> Result<()> {
    let titles = service.titles();
    if requests == 0 || titles.is_empty() {
        bail!("Nothing to benchmark");
    }

    // Random titles from the catalog
    let queries: Vec<&str> = (0..requests)
        .map(|_| titles[rand::random::<u32>() as usize % titles.len()].as_str())
        .collect();

    let total_start = Instant::now();
    let mut timings = Vec::with_capacity(requests);
    for title in queries {
        let start = Instant::now();
        service
            .recommend(title, service.top_k())
            .with_context(|| format!("Query for '{}' failed", title))?;
        timings.push(start.elapsed());
    }
    let total_time = total_start.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", requests);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print the "Because you watched" shelf
fn print_shelf(title: &str, cards: &[PosterCard]) {
    println!("{}", format!("Because you watched {}", title).bold().blue());
    for (i, card) in cards.iter().enumerate() {
        println!(
            "{}. {} [{}]",
            (i + 1).to_string().green(),
            card.title,
            card.movie_id
        );
        let poster = card.poster_or_placeholder();
        if card.poster_url.is_some() {
            println!("   {}", poster.cyan());
        } else {
            println!("   {}", poster.dimmed());
        }
    }
}

/// Distinct titles containing `filter` (case-insensitive), exact matches first
fn filter_titles<'a>(titles: &'a [String], filter: &str) -> Vec<&'a str> {
    let needle = filter.to_lowercase();
    let mut seen = HashSet::new();
    let mut exact = Vec::new();
    let mut partial = Vec::new();

    for title in titles {
        if !seen.insert(title.as_str()) {
            continue;
        }
        let lower = title.to_lowercase();
        if !needle.is_empty() && lower == needle {
            exact.push(title.as_str());
        } else if lower.contains(&needle) {
            partial.push(title.as_str());
        }
    }

    exact.extend(partial);
    exact
}

/// Nearest-rank percentile of sorted timings
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
