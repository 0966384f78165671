//! Poster lookup for recommended movies.
//!
//! This crate provides the `PosterProvider` capability used to decorate
//! recommendations with a poster image URL. It handles:
//! - Fetching movie details from TMDB over HTTP
//! - Turning a `poster_path` into a full image URL
//! - Collapsing every failure (no key, timeout, bad status) into `None`
//!
//! Poster lookup is decoration only. A provider never fails a query: errors
//! are logged at `warn` and the caller simply gets no poster.

use async_trait::async_trait;
use thiserror::Error;

pub mod tmdb;

pub use tmdb::{TmdbConfig, TmdbPosterProvider, poster_url_from_details};

/// Movie id as used by TMDB
pub type MovieId = u32;

/// Errors that can occur while talking to the poster service
#[derive(Error, Debug)]
pub enum PosterError {
    #[error("No TMDB API key configured")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDB returned status {status} for movie {movie_id}")]
    Status { movie_id: MovieId, status: u16 },

    #[error("Invalid response from TMDB: {0}")]
    InvalidResponse(String),
}

/// Something that can find a poster image for a movie.
///
/// Implementations must be cheap to share across tasks; the recommendation
/// service holds them behind an `Arc` and calls them concurrently.
#[async_trait]
pub trait PosterProvider: Send + Sync {
    /// Poster URL for `movie_id`, or `None` when there is none or the
    /// lookup failed
    async fn poster_url(&self, movie_id: MovieId) -> Option<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Provider that never returns a poster
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosterProvider;

#[async_trait]
impl PosterProvider for NoPosterProvider {
    async fn poster_url(&self, _movie_id: MovieId) -> Option<String> {
        None
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
