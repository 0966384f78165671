//! # Recommendation Service
//!
//! Coordinates one recommendation request:
//! 1. Resolve the title and rank similar movies (synchronous, read-only)
//! 2. Look up posters for the results, one task per movie
//! 3. Return poster cards in ranking order
//!
//! Poster lookups are decoration. They run concurrently, and a failed or
//! panicked lookup only costs that card its poster; the ranking never changes.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use data_loader::{Corpus, MovieId};
use pipeline::{PipelineConfig, PipelineState, QueryError, Recommendation};
use poster_client::PosterProvider;

/// Image shown when a movie has no poster
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/200x300/111/888?text=No+Poster";

/// One recommended movie, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosterCard {
    pub title: String,
    pub movie_id: MovieId,
    pub poster_url: Option<String>,
}

impl PosterCard {
    pub fn poster_or_placeholder(&self) -> &str {
        self.poster_url.as_deref().unwrap_or(PLACEHOLDER_POSTER)
    }
}

/// Load both CSVs from `data_dir` and run the full pipeline
pub fn build_state(data_dir: &Path, config: &PipelineConfig) -> Result<PipelineState> {
    let start = Instant::now();
    let corpus = Corpus::load_from_dir(data_dir)
        .with_context(|| format!("Failed to load dataset from {}", data_dir.display()))?;
    info!("Loaded {} movies in {:.2?}", corpus.len(), start.elapsed());

    Ok(PipelineState::build(corpus, config))
}

/// Ranking plus poster enrichment over a shared pipeline state
#[derive(Clone)]
pub struct RecommendationService {
    state: Arc<PipelineState>,
    posters: Arc<dyn PosterProvider>,
    top_k: usize,
}

impl RecommendationService {
    pub fn new(state: Arc<PipelineState>, posters: Arc<dyn PosterProvider>) -> Self {
        Self {
            state,
            posters,
            top_k: pipeline::DEFAULT_TOP_K,
        }
    }

    /// Change how many movies `recommend_with_posters` returns
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Build eagerly from a data directory
    pub fn load(
        data_dir: &Path,
        config: &PipelineConfig,
        posters: Arc<dyn PosterProvider>,
    ) -> Result<Self> {
        let state = build_state(data_dir, config)?;
        Ok(Self::new(Arc::new(state), posters))
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn poster_provider(&self) -> &dyn PosterProvider {
        self.posters.as_ref()
    }

    /// Title catalog in corpus order
    pub fn titles(&self) -> &[String] {
        self.state.titles()
    }

    /// Ranked results without posters
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation>, QueryError> {
        self.state.recommend(title, k)
    }

    /// Top movies for `title` with posters.
    ///
    /// An unknown title gives an empty list.
    pub async fn recommend_with_posters(&self, title: &str) -> Vec<PosterCard> {
        self.recommend_with_posters_limit(title, self.top_k).await
    }

    pub async fn recommend_with_posters_limit(&self, title: &str, k: usize) -> Vec<PosterCard> {
        let start = Instant::now();

        let recommendations = match self.state.recommend(title, k) {
            Ok(recs) => recs,
            Err(e) => {
                warn!("{}", e);
                return Vec::new();
            }
        };
        debug!("Ranked {} movies for '{}'", recommendations.len(), title);

        let cards = self.attach_posters(recommendations).await;
        info!(
            "Recommended {} movies for '{}' in {:.2?}",
            cards.len(),
            title,
            start.elapsed()
        );
        cards
    }

    /// Look up posters concurrently, keeping the ranking order
    async fn attach_posters(&self, recommendations: Vec<Recommendation>) -> Vec<PosterCard> {
        let lookups: Vec<_> = recommendations
            .iter()
            .map(|rec| {
                let provider = Arc::clone(&self.posters);
                let movie_id = rec.movie_id;
                tokio::spawn(async move { provider.poster_url(movie_id).await })
            })
            .collect();

        let mut cards = Vec::with_capacity(recommendations.len());
        for (rec, lookup) in recommendations.into_iter().zip(lookups) {
            let poster_url = match lookup.await {
                Ok(url) => url,
                Err(e) => {
                    warn!(
                        movie_id = rec.movie_id,
                        provider = self.posters.name(),
                        "Poster task failed: {}",
                        e
                    );
                    None
                }
            };
            cards.push(PosterCard {
                title: rec.title,
                movie_id: rec.movie_id,
                poster_url,
            });
        }
        cards
    }
}
