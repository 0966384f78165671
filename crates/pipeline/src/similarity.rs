//! All-pairs cosine similarity over count vectors.
//!
//! The matrix is dense and computed once. Every cell is computed on its own
//! (dot product merged in column order, divided by the product of the two
//! norms), so `sim[i][j]` and `sim[j][i]` come out bit-identical and the
//! result does not depend on how rows are scheduled across threads. Scores
//! are kept in `f64` so that near-equal cosines still rank by value.

use crate::vectorizer::{CountMatrix, SparseRow};
use rayon::prelude::*;
use tracing::debug;

/// Symmetric N×N matrix of cosine similarities in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity of rows `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.row(i)?.get(j).copied()
    }

    /// All similarities of row `i`
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.n {
            return None;
        }
        Some(&self.values[i * self.n..(i + 1) * self.n])
    }
}

/// Dot product of two sparse rows sorted by column
fn sparse_dot(a: &SparseRow, b: &SparseRow) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0f64;
    while i < a.len() && j < b.len() {
        let (col_a, count_a) = a[i];
        let (col_b, count_b) = b[j];
        match col_a.cmp(&col_b) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += count_a as f64 * count_b as f64;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

fn norm(row: &SparseRow) -> f64 {
    row.iter()
        .map(|&(_, count)| count as f64 * count as f64)
        .sum::<f64>()
        .sqrt()
}

/// Cosine of two count vectors; 0 when either is all zeros
pub fn cosine(a: &SparseRow, b: &SparseRow) -> f64 {
    cosine_with_norms(a, norm(a), b, norm(b))
}

fn cosine_with_norms(a: &SparseRow, norm_a: f64, b: &SparseRow, norm_b: f64) -> f64 {
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return 0.0;
    }
    (sparse_dot(a, b) / denom).clamp(0.0, 1.0)
}

/// Compute the full similarity matrix for `matrix`.
///
/// The diagonal is exactly 1.0 for every non-zero row and 0.0 for an
/// all-zero row.
pub fn compute_similarity(matrix: &CountMatrix) -> SimilarityMatrix {
    let rows = matrix.rows();
    let n = rows.len();
    let norms: Vec<f64> = rows.iter().map(norm).collect();

    let values: Vec<f64> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let rows = &rows;
            let norms = &norms;
            (0..n).map(move |j| {
                if i == j {
                    if norms[i] > 0.0 { 1.0 } else { 0.0 }
                } else {
                    cosine_with_norms(&rows[i], norms[i], &rows[j], norms[j])
                }
            })
        })
        .collect();

    debug!("Computed {}x{} similarity matrix", n, n);
    SimilarityMatrix { n, values }
}
