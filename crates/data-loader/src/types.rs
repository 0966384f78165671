//! Core domain types for the TMDB 5000 dataset.
//!
//! Two kinds of types live here:
//! - raw rows, deserialized straight from the CSV files with the nested
//!   fields still in their serialized form
//! - [`MovieRecord`], the normalized movie that the rest of the system uses

use serde::{Deserialize, Serialize};

/// TMDB movie identifier
pub type MovieId = u32;

/// Position of a movie in the [`Corpus`]. Shared by the vector space and the
/// similarity matrix, so it must not change once assigned.
pub type RowIndex = usize;

// =============================================================================
// Raw rows
// =============================================================================

/// One row of `tmdb_5000_movies.csv`.
///
/// Only the columns the recommender needs are deserialized; the CSV reader
/// ignores the rest by header name.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovieRow {
    pub id: MovieId,
    pub title: String,
    /// Serialized list of `{"id": .., "name": ..}` objects
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

/// One row of `tmdb_5000_credits.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCreditRow {
    pub movie_id: MovieId,
    /// Serialized list of `{"name": .., "character": .., ...}` objects, billing order
    #[serde(default)]
    pub cast: Option<String>,
    /// Serialized list of `{"name": .., "job": .., ...}` objects
    #[serde(default)]
    pub crew: Option<String>,
}

/// A movie row joined with its credits row, nested fields still raw.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub movie: RawMovieRow,
    pub credits: RawCreditRow,
}

// =============================================================================
// Normalized record
// =============================================================================

/// A movie with its categorical fields normalized into single-word tokens.
///
/// Multi-word names are collapsed ("Tom Hanks" -> "TomHanks") so that the
/// bag-of-words space sees one term per person, keyword or genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    /// Top-billed cast, at most three
    pub cast: Vec<String>,
    /// The director, if one was credited
    pub crew: Vec<String>,
    /// Derived document; empty until the soup builder fills it in
    #[serde(default)]
    pub soup: String,
}

impl MovieRecord {
    /// Create a record with no features, mostly useful for tests
    pub fn new(movie_id: MovieId, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            genres: Vec::new(),
            keywords: Vec::new(),
            cast: Vec::new(),
            crew: Vec::new(),
            soup: String::new(),
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cast<I, S>(mut self, cast: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cast = cast.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_crew<I, S>(mut self, crew: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crew = crew.into_iter().map(Into::into).collect();
        self
    }
}

// =============================================================================
// Corpus
// =============================================================================

/// Ordered collection of normalized movies; a movie's position is its
/// [`RowIndex`].
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<MovieRecord>,
}

impl Corpus {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: RowIndex) -> Option<&MovieRecord> {
        self.records.get(row)
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.records.iter()
    }

    /// Mutable access for the one-time soup fill during the build
    pub fn records_mut(&mut self) -> &mut [MovieRecord] {
        &mut self.records
    }
}

impl From<Vec<MovieRecord>> for Corpus {
    fn from(records: Vec<MovieRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
