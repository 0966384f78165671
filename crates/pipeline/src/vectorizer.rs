//! Bag-of-words vectorizer.
//!
//! ## Algorithm
//! 1. Lower-case each soup and split it into tokens of two or more word
//!    characters
//! 2. Drop English stop words
//! 3. Count every remaining term over the whole corpus and keep the
//!    `max_features` most frequent (ties go to the lexicographically smaller
//!    term)
//! 4. Order the kept terms lexicographically; that order is the column order
//! 5. Project each soup onto the vocabulary as sparse term counts
//!
//! Nothing here depends on hash iteration order, so two runs over the same
//! soups give identical vocabularies and rows.

use crate::stopwords::is_stop_word;
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
}

/// Lower-cased, stop-word-free tokens of `text`, in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Vocabulary
// =============================================================================

/// Fixed set of terms; a term's position is its column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    columns: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from terms already in column order
    fn from_sorted_terms(terms: Vec<String>) -> Self {
        let columns = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.clone(), col))
            .collect();
        Self { terms, columns }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.columns.get(term).copied()
    }

    /// Terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

// =============================================================================
// Count matrix
// =============================================================================

/// `(column, count)` pairs sorted by column, zero counts omitted
pub type SparseRow = Vec<(usize, u32)>;

/// One sparse count row per document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMatrix {
    rows: Vec<SparseRow>,
    n_cols: usize,
}

impl CountMatrix {
    pub fn new(rows: Vec<SparseRow>, n_cols: usize) -> Self {
        Self { rows, n_cols }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, row: usize) -> Option<&SparseRow> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// Row expanded to `n_cols` counts
    pub fn dense_row(&self, row: usize) -> Option<Vec<u32>> {
        let sparse = self.rows.get(row)?;
        let mut dense = vec![0; self.n_cols];
        for &(col, count) in sparse {
            dense[col] = count;
        }
        Some(dense)
    }
}

// =============================================================================
// Vectorizer
// =============================================================================

/// Count vectorizer with a capped vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct Vectorizer {
    max_features: usize,
}

impl Vectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Learn the vocabulary from a corpus of soups
    pub fn fit<S: AsRef<str> + Sync>(&self, soups: &[S]) -> Vocabulary {
        let mut frequencies: HashMap<String, u64> = HashMap::new();
        for soup in soups {
            for token in tokenize(soup.as_ref()) {
                *frequencies.entry(token).or_insert(0) += 1;
            }
        }
        let distinct = frequencies.len();

        let mut ranked: Vec<(String, u64)> = frequencies.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        debug!(
            "Vocabulary: kept {} of {} distinct terms (cap {})",
            terms.len(),
            distinct,
            self.max_features
        );
        Vocabulary::from_sorted_terms(terms)
    }

    /// Project one document onto an existing vocabulary; unknown terms are ignored
    pub fn transform(&self, vocabulary: &Vocabulary, soup: &str) -> SparseRow {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for token in tokenize(soup) {
            if let Some(col) = vocabulary.column(&token) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// Learn the vocabulary and vectorize every soup, one row per input
    pub fn fit_transform<S: AsRef<str> + Sync>(&self, soups: &[S]) -> (Vocabulary, CountMatrix) {
        let vocabulary = self.fit(soups);
        let rows: Vec<SparseRow> = soups
            .par_iter()
            .map(|soup| self.transform(&vocabulary, soup.as_ref()))
            .collect();
        let matrix = CountMatrix::new(rows, vocabulary.len());
        (vocabulary, matrix)
    }
}

impl Default for Vectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}
