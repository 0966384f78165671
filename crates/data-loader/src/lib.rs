//! # Data Loader Crate
//!
//! This crate handles loading and normalizing the TMDB 5000 movie dataset.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (raw CSV rows, MovieRecord, Corpus)
//! - **parser**: Parse the movies and credits CSV files
//! - **literal**: Read the serialized list-of-object columns (JSON or Python literal)
//! - **normalizer**: Turn nested fields into single-word tokens
//! - **index**: Join the two files, build the Corpus and the TitleIndex
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Corpus, TitleIndex};
//! use std::path::Path;
//!
//! let corpus = Corpus::load_from_dir(Path::new("data"))?;
//! let titles = TitleIndex::from_corpus(&corpus);
//!
//! let row = titles.get("Avatar").unwrap();
//! println!("{:?}", corpus.get(row).unwrap().cast);
//! ```

pub mod error;
pub mod index;
pub mod literal;
pub mod normalizer;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{DatasetPaths, TitleIndex, join_rows};
pub use normalizer::{
    FieldParse, TOP_CAST_LIMIT, collapse_whitespace, extract_director, extract_names,
    extract_top_cast,
};
pub use types::{
    // Type aliases
    MovieId,
    RowIndex,
    // Core types
    Corpus,
    JoinedRow,
    MovieRecord,
    RawCreditRow,
    RawMovieRow,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus() {
        let corpus = Corpus::default();
        assert!(corpus.is_empty());
        assert!(corpus.get(0).is_none());
        assert!(TitleIndex::from_corpus(&corpus).titles().is_empty());
    }

    #[test]
    fn test_record_builder() {
        let record = MovieRecord::new(862, "Toy Story")
            .with_genres(["Animation", "Comedy"])
            .with_cast(["TomHanks"])
            .with_crew(["JohnLasseter"]);

        assert_eq!(record.movie_id, 862);
        assert_eq!(record.genres.len(), 2);
        assert!(record.keywords.is_empty());
        assert!(record.soup.is_empty());
    }
}
