//! Environment configuration.
//!
//! Values come from the process environment, with a `.env` file loaded
//! first when one exists. Every key except the TMDB API key has a default.

use pipeline::{DEFAULT_MAX_FEATURES, DEFAULT_TOP_K, PipelineConfig};
use poster_client::TmdbConfig;
use poster_client::tmdb::{DEFAULT_API_URL, DEFAULT_IMAGE_BASE_URL};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB API key; posters are disabled without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Per-request poster timeout in seconds
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Directory holding the two TMDB CSV files
    #[serde(default = "default_data_dir")]
    pub qulu_data_dir: PathBuf,

    #[serde(default = "default_max_features")]
    pub qulu_max_features: usize,

    #[serde(default = "default_top_k")]
    pub qulu_top_k: usize,
}

fn default_tmdb_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_tmdb_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

fn default_poster_timeout_secs() -> u64 {
    5
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_image_base_url: default_tmdb_image_base_url(),
            poster_timeout_secs: default_poster_timeout_secs(),
            qulu_data_dir: default_data_dir(),
            qulu_max_features: default_max_features(),
            qulu_top_k: default_top_k(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<AppConfig>()
            .map(Self::normalized)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_pairs<I>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, AppConfig>(pairs)
            .map(Self::normalized)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    // A blank key is the same as no key
    fn normalized(mut self) -> Self {
        self.tmdb_api_key = self
            .tmdb_api_key
            .take()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        self
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_features: self.qulu_max_features,
        }
    }

    pub fn tmdb_config(&self) -> TmdbConfig {
        TmdbConfig {
            api_key: self.tmdb_api_key.clone(),
            api_url: self.tmdb_api_url.clone(),
            image_base_url: self.tmdb_image_base_url.clone(),
            timeout: Duration::from_secs(self.poster_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_pairs(Vec::new()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.qulu_data_dir, PathBuf::from("data"));
        assert_eq!(config.qulu_max_features, 10_000);
        assert_eq!(config.qulu_top_k, 5);
        assert_eq!(config.tmdb_config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_pairs(pairs(&[
            ("TMDB_API_KEY", "abc123"),
            ("POSTER_TIMEOUT_SECS", "2"),
            ("QULU_DATA_DIR", "/srv/tmdb"),
            ("QULU_MAX_FEATURES", "500"),
            ("QULU_TOP_K", "8"),
        ]))
        .unwrap();

        assert_eq!(config.tmdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.qulu_data_dir, PathBuf::from("/srv/tmdb"));
        assert_eq!(config.pipeline_config().max_features, 500);
        assert_eq!(config.qulu_top_k, 8);
        assert_eq!(config.tmdb_config().timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let config = AppConfig::from_pairs(pairs(&[("TMDB_API_KEY", "  ")])).unwrap();
        assert!(config.tmdb_api_key.is_none());
    }

    #[test]
    fn test_invalid_number_is_error() {
        assert!(AppConfig::from_pairs(pairs(&[("QULU_TOP_K", "many")])).is_err());
    }
}
