//! Error types for the data-loader crate.
//!
//! Everything here is fatal at startup: if the datasets cannot be read or
//! joined, the recommender has nothing to serve. Malformed nested fields are
//! *not* errors at this level; the normalizer recovers them locally (see
//! [`crate::normalizer::FieldParse`]).

use thiserror::Error;

/// Errors that can occur while loading and joining the TMDB datasets
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// None of the candidate locations contained the file
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the file (bad quoting, inconsistent row length, ...)
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A header the loader depends on is absent
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Row in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
