//! TMDB poster provider.
//!
//! API flow: `GET {api_url}/movie/{id}?api_key=...` returns the movie
//! details, whose `poster_path` is appended to the image base URL.

use crate::{MovieId, PosterError, PosterProvider};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for TMDB
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// Without a key the provider never makes a request
    pub api_key: Option<String>,
    pub api_url: String,
    pub image_base_url: String,
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    #[serde(default)]
    poster_path: Option<String>,
}

/// Full poster URL from a TMDB movie details body.
///
/// Returns `None` when `poster_path` is missing, null, or empty.
pub fn poster_url_from_details(image_base_url: &str, details: &serde_json::Value) -> Option<String> {
    let details: MovieDetails = serde_json::from_value(details.clone()).ok()?;
    details
        .poster_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", image_base_url, path))
}

#[derive(Debug, Clone)]
pub struct TmdbPosterProvider {
    http_client: HttpClient,
    config: TmdbConfig,
}

impl TmdbPosterProvider {
    /// Create a provider with a per-request timeout
    pub fn new(config: TmdbConfig) -> Result<Self, PosterError> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PosterError::ClientBuild)?;

        if config.api_key.is_none() {
            warn!("TMDB_API_KEY not set, posters disabled");
        }

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Look up the poster for one movie.
    ///
    /// `Ok(None)` means TMDB answered but has no poster for this movie.
    pub async fn fetch_poster(&self, movie_id: MovieId) -> Result<Option<String>, PosterError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(PosterError::MissingApiKey)?;

        let url = format!("{}/movie/{}", self.config.api_url.trim_end_matches('/'), movie_id);
        debug!("Fetching TMDB details for movie {}", movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PosterError::Status {
                movie_id,
                status: response.status().as_u16(),
            });
        }

        let details: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PosterError::InvalidResponse(e.to_string()))?;

        Ok(poster_url_from_details(&self.config.image_base_url, &details))
    }
}

#[async_trait]
impl PosterProvider for TmdbPosterProvider {
    async fn poster_url(&self, movie_id: MovieId) -> Option<String> {
        if !self.has_api_key() {
            return None;
        }

        match self.fetch_poster(movie_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!(movie_id, error = %e, "Poster lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
