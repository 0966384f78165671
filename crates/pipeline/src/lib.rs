//! Content-based similarity pipeline for movie recommendations.
//!
//! This crate provides:
//! - `soup`: one whitespace-joined document per movie
//! - `vectorizer`: capped bag-of-words vocabulary and count vectors
//! - `similarity`: all-pairs cosine similarity matrix
//! - `query`: top-K ranking by title
//! - `state`: `PipelineState`, the immutable result of running all of the above
//!
//! ## Architecture
//! The pipeline runs once, strictly in one direction:
//! 1. Normalized corpus (from `data-loader`)
//! 2. Soup per movie
//! 3. Count vector per movie
//! 4. Similarity matrix
//! 5. Queries are read-only lookups against the result
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::Corpus;
//! use pipeline::{PipelineConfig, PipelineState};
//!
//! let corpus = Corpus::load_from_dir(Path::new("data"))?;
//! let state = PipelineState::build(corpus, &PipelineConfig::default());
//!
//! for rec in state.recommend("Avatar", 5)? {
//!     println!("{} ({:.3})", rec.title, rec.score);
//! }
//! ```

pub mod query;
pub mod similarity;
pub mod soup;
pub mod state;
pub mod stopwords;
pub mod vectorizer;

// Re-export main types
pub use query::{DEFAULT_TOP_K, QueryError, Recommendation, rank_similar};
pub use similarity::{SimilarityMatrix, compute_similarity, cosine};
pub use soup::build_soup;
pub use state::{PipelineConfig, PipelineState};
pub use vectorizer::{CountMatrix, DEFAULT_MAX_FEATURES, SparseRow, Vectorizer, Vocabulary, tokenize};
