//! Server crate for the Qulu recommender.
//!
//! This crate wires configuration, the similarity pipeline and poster
//! lookup into a `RecommendationService`, with a lazy build guard for
//! callers that want the dataset loaded on first use.

pub mod config;
pub mod lazy;
pub mod orchestrator;

pub use config::AppConfig;
pub use lazy::{LazyRecommender, poster_provider};
pub use orchestrator::{PLACEHOLDER_POSTER, PosterCard, RecommendationService, build_state};
