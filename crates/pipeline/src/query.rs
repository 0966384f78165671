//! Recommender query service.
//!
//! Resolves a title to its row and ranks every other movie by similarity.

use crate::similarity::SimilarityMatrix;
use data_loader::{MovieId, RowIndex};
use std::cmp::Ordering;
use thiserror::Error;

/// Number of recommendations returned when the caller doesn't say
pub const DEFAULT_TOP_K: usize = 5;

/// Errors returned by recommendation queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Movie not found: {title}")]
    NotFound { title: String },
}

/// One ranked result
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub row: RowIndex,
    pub movie_id: MovieId,
    pub title: String,
    pub score: f64,
}

/// Rows most similar to `row`, best first.
///
/// Ties on score go to the lower row index. `row` itself is never returned,
/// and fewer than `k` results come back when the corpus is small.
pub fn rank_similar(similarity: &SimilarityMatrix, row: RowIndex, k: usize) -> Vec<(RowIndex, f64)> {
    let Some(scores) = similarity.row(row) else {
        return Vec::new();
    };

    let mut ranked: Vec<(RowIndex, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(other, _)| other != row)
        .collect();

    let by_score = |a: &(RowIndex, f64), b: &(RowIndex, f64)| -> Ordering {
        b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
    };
    if k < ranked.len() {
        ranked.select_nth_unstable_by(k, by_score);
        ranked.truncate(k);
    }
    ranked.sort_by(by_score);
    ranked
}
