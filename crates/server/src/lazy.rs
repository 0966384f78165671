//! Lazy, at-most-once construction of the recommendation service.
//!
//! The first caller triggers the build (CSV load plus pipeline) on a
//! blocking thread; concurrent callers wait for that same build. Once built,
//! the service is handed out by reference with no further locking.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;
use tracing::info;

use pipeline::PipelineConfig;
use poster_client::{NoPosterProvider, PosterProvider, TmdbPosterProvider};

use crate::config::AppConfig;
use crate::orchestrator::{PosterCard, RecommendationService, build_state};

pub struct LazyRecommender {
    data_dir: PathBuf,
    pipeline_config: PipelineConfig,
    posters: Arc<dyn PosterProvider>,
    top_k: usize,
    service: OnceCell<RecommendationService>,
}

impl LazyRecommender {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        pipeline_config: PipelineConfig,
        posters: Arc<dyn PosterProvider>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            pipeline_config,
            posters,
            top_k: pipeline::DEFAULT_TOP_K,
            service: OnceCell::new(),
        }
    }

    /// Everything from configuration, TMDB posters when a key is set
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let posters = poster_provider(config)?;
        Ok(Self::new(&config.qulu_data_dir, config.pipeline_config(), posters)
            .with_top_k(config.qulu_top_k))
    }

    /// Wrap a service that is already built
    pub fn ready(service: RecommendationService) -> Self {
        Self {
            data_dir: PathBuf::new(),
            pipeline_config: PipelineConfig::default(),
            posters: Arc::new(NoPosterProvider),
            top_k: service.top_k(),
            service: OnceCell::from(service),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn is_built(&self) -> bool {
        self.service.initialized()
    }

    /// The service, building it on first use
    pub async fn get(&self) -> Result<&RecommendationService> {
        self.service
            .get_or_try_init(|| async {
                info!("Building recommender from {}", self.data_dir.display());
                let data_dir = self.data_dir.clone();
                let config = self.pipeline_config;

                let state = tokio::task::spawn_blocking(move || build_state(&data_dir, &config))
                    .await
                    .context("Pipeline build task panicked")??;

                Ok::<_, anyhow::Error>(
                    RecommendationService::new(Arc::new(state), Arc::clone(&self.posters))
                        .with_top_k(self.top_k),
                )
            })
            .await
    }

    pub async fn titles(&self) -> Result<&[String]> {
        Ok(self.get().await?.titles())
    }

    pub async fn recommend_with_posters(&self, title: &str) -> Result<Vec<PosterCard>> {
        Ok(self.get().await?.recommend_with_posters(title).await)
    }
}

/// TMDB provider when an API key is configured, otherwise no posters
pub fn poster_provider(config: &AppConfig) -> Result<Arc<dyn PosterProvider>> {
    if config.tmdb_api_key.is_none() {
        info!("No TMDB API key configured, posters disabled");
        return Ok(Arc::new(NoPosterProvider));
    }
    let provider =
        TmdbPosterProvider::new(config.tmdb_config()).context("Failed to create TMDB client")?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const MOVIES_CSV: &str = r#"budget,genres,id,keywords,overview,title
1,"[{""id"": 28, ""name"": ""Action""}]",10,"[{""id"": 1, ""name"": ""heist""}]",A crew plans a job,Heat
1,"[{""id"": 28, ""name"": ""Action""}]",11,"[{""id"": 1, ""name"": ""heist""}]",Dreams inside dreams,Inception
1,"[{""id"": 16, ""name"": ""Animation""}]",12,"[{""id"": 2, ""name"": ""toy""}]",Toys come alive,Toy Story
"#;

    const CREDITS_CSV: &str = r#"movie_id,title,cast,crew
10,Heat,"[{""name"": ""Al Pacino""}]","[{""job"": ""Director"", ""name"": ""Michael Mann""}]"
11,Inception,"[{""name"": ""Leonardo DiCaprio""}]","[{""job"": ""Director"", ""name"": ""Christopher Nolan""}]"
12,Toy Story,"[{""name"": ""Tom Hanks""}]","[{""job"": ""Director"", ""name"": ""John Lasseter""}]"
"#;

    fn write_dataset(dir: &Path) {
        fs::write(dir.join("tmdb_5000_movies.csv"), MOVIES_CSV).unwrap();
        fs::write(dir.join("tmdb_5000_credits.csv"), CREDITS_CSV).unwrap();
    }

    #[tokio::test]
    async fn test_builds_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());

        let lazy = LazyRecommender::new(dir.path(), PipelineConfig::default(), Arc::new(NoPosterProvider));
        assert!(!lazy.is_built());

        let titles = lazy.titles().await.unwrap();
        assert_eq!(titles, &["Heat", "Inception", "Toy Story"]);
        assert!(lazy.is_built());

        let cards = lazy.recommend_with_posters("Heat").await.unwrap();
        assert_eq!(cards[0].title, "Inception");
        assert_eq!(cards.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_build() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let lazy = LazyRecommender::new(dir.path(), PipelineConfig::default(), Arc::new(NoPosterProvider));

        let (a, b) = tokio::join!(lazy.get(), lazy.get());
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(std::ptr::eq(a, b));
        assert!(std::ptr::eq(a.state(), b.state()));
    }

    #[tokio::test]
    async fn test_missing_data_is_error_and_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let lazy = LazyRecommender::new(dir.path(), PipelineConfig::default(), Arc::new(NoPosterProvider));

        assert!(lazy.get().await.is_err());
        assert!(!lazy.is_built());

        write_dataset(dir.path());
        assert!(lazy.get().await.is_ok());
    }

    #[tokio::test]
    async fn test_ready_service_skips_build() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let service = RecommendationService::load(
            dir.path(),
            &PipelineConfig::default(),
            Arc::new(NoPosterProvider),
        )
        .unwrap()
        .with_top_k(1);

        let lazy = LazyRecommender::ready(service);
        assert!(lazy.is_built());
        assert_eq!(lazy.recommend_with_posters("Inception").await.unwrap().len(), 1);
    }

    #[test]
    fn test_provider_choice() {
        let config = AppConfig::default();
        assert_eq!(poster_provider(&config).unwrap().name(), "none");

        let config = AppConfig {
            tmdb_api_key: Some("key".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(poster_provider(&config).unwrap().name(), "tmdb");
    }
}
