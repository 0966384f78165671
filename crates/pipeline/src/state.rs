//! Query-ready pipeline state.
//!
//! [`PipelineState::build`] runs the whole startup pipeline once:
//! normalized corpus -> soups -> count vectors -> similarity matrix, plus the
//! title index. The result is immutable and can be shared across threads
//! behind an `Arc` without locking.

use crate::query::{QueryError, Recommendation, rank_similar};
use crate::similarity::{SimilarityMatrix, compute_similarity};
use crate::soup::fill_soups;
use crate::vectorizer::{CountMatrix, DEFAULT_MAX_FEATURES, Vectorizer, Vocabulary};
use data_loader::{Corpus, MovieRecord, RowIndex, TitleIndex};
use std::time::Instant;
use tracing::{debug, info};

/// Build-time settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Vocabulary cap
    pub max_features: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

/// Everything a query needs, built once
#[derive(Debug, Clone)]
pub struct PipelineState {
    corpus: Corpus,
    vocabulary: Vocabulary,
    counts: CountMatrix,
    similarity: SimilarityMatrix,
    title_index: TitleIndex,
}

impl PipelineState {
    /// Run the pipeline over a normalized corpus
    pub fn build(mut corpus: Corpus, config: &PipelineConfig) -> Self {
        let start = Instant::now();

        fill_soups(&mut corpus);
        let soups: Vec<&str> = corpus.iter().map(|m| m.soup.as_str()).collect();
        debug!("Built {} soups", soups.len());

        let vectorizer = Vectorizer::new(config.max_features);
        let (vocabulary, counts) = vectorizer.fit_transform(&soups);
        info!(
            "Vectorized {} movies over {} terms",
            counts.n_rows(),
            vocabulary.len()
        );

        let similarity = compute_similarity(&counts);
        let title_index = TitleIndex::from_corpus(&corpus);

        info!(
            "Pipeline built for {} movies in {:.2?}",
            corpus.len(),
            start.elapsed()
        );
        Self {
            corpus,
            vocabulary,
            counts,
            similarity,
            title_index,
        }
    }

    /// Convenience for tests and synthetic corpora
    pub fn from_records(records: Vec<MovieRecord>, config: &PipelineConfig) -> Self {
        Self::build(Corpus::new(records), config)
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn counts(&self) -> &CountMatrix {
        &self.counts
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn title_index(&self) -> &TitleIndex {
        &self.title_index
    }

    /// Title catalog in corpus order, duplicates included
    pub fn titles(&self) -> &[String] {
        self.title_index.titles()
    }

    /// Top `k` movies similar to `title`
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation>, QueryError> {
        let row = self
            .title_index
            .get(title)
            .ok_or_else(|| QueryError::NotFound {
                title: title.to_string(),
            })?;
        Ok(self.recommend_row(row, k))
    }

    /// Top `k` movies similar to the movie at `row`
    pub fn recommend_row(&self, row: RowIndex, k: usize) -> Vec<Recommendation> {
        rank_similar(&self.similarity, row, k)
            .into_iter()
            .filter_map(|(other, score)| {
                let movie = self.corpus.get(other)?;
                Some(Recommendation {
                    row: other,
                    movie_id: movie.movie_id,
                    title: movie.title.clone(),
                    score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DEFAULT_TOP_K;

    fn small_state() -> PipelineState {
        PipelineState::from_records(
            vec![
                MovieRecord::new(1, "Alien")
                    .with_keywords(["space", "monster"])
                    .with_crew(["RidleyScott"])
                    .with_genres(["Horror", "ScienceFiction"]),
                MovieRecord::new(2, "Aliens")
                    .with_keywords(["space", "monster", "marine"])
                    .with_crew(["JamesCameron"])
                    .with_genres(["Action", "ScienceFiction"]),
                MovieRecord::new(3, "Titanic")
                    .with_keywords(["ship", "romance"])
                    .with_crew(["JamesCameron"])
                    .with_genres(["Drama", "Romance"]),
                MovieRecord::new(4, "Alien"),
            ],
            &PipelineConfig::default(),
        )
    }

    #[test]
    fn test_soups_filled() {
        let state = small_state();
        assert_eq!(
            state.corpus().get(0).unwrap().soup,
            "space monster  RidleyScott Horror ScienceFiction"
        );
    }

    #[test]
    fn test_recommend_by_title() {
        let state = small_state();
        let recs = state.recommend("Alien", DEFAULT_TOP_K).unwrap();

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "Aliens");
        assert_eq!(recs[0].movie_id, 2);
        assert!(recs.iter().all(|r| r.row != 0));
    }

    #[test]
    fn test_duplicate_title_resolves_to_first() {
        let state = small_state();
        assert_eq!(state.title_index().get("Alien"), Some(0));
        assert_eq!(state.titles().len(), 4);
    }

    #[test]
    fn test_unknown_title() {
        let state = small_state();
        let err = state.recommend("NonexistentMovie12345", 5).unwrap_err();
        assert_eq!(
            err,
            QueryError::NotFound {
                title: "NonexistentMovie12345".to_string()
            }
        );
    }
}
