//! Simple test harness for the recommendation service.
//!
//! Loads the dataset named by the environment configuration and prints the
//! poster shelf for one title (default "Avatar", or the first argument).

use anyhow::Result;
use tracing::info;

use server::{AppConfig, LazyRecommender};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,pipeline=debug,poster_client=debug")
        .init();

    info!("Starting Qulu server test harness");

    let config = AppConfig::from_env()?;
    let recommender = LazyRecommender::from_config(&config)?;

    let title = std::env::args().nth(1).unwrap_or_else(|| "Avatar".to_string());
    info!("Getting recommendations for '{}'", title);
    let cards = recommender.recommend_with_posters(&title).await?;

    info!("Received {} recommendations:", cards.len());
    for (i, card) in cards.iter().enumerate() {
        info!("{}. {} [{}]", i + 1, card.title, card.movie_id);
        info!("   {}", card.poster_or_placeholder());
    }

    Ok(())
}
