//! Parser for the TMDB 5000 CSV files.
//!
//! - `tmdb_5000_movies.csv`: id, title, overview, genres, keywords, ...
//! - `tmdb_5000_credits.csv`: movie_id, title, cast, crew
//!
//! Rows are deserialized by header name, so column order and extra
//! columns don't matter. A row whose required columns can't be read is a
//! fatal [`DataLoadError`]; the nested list columns are kept as raw strings
//! for the normalizer.

use crate::error::{DataLoadError, Result};
use crate::types::{RawCreditRow, RawMovieRow};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

pub const MOVIES_FILE: &str = "tmdb_5000_movies.csv";
pub const CREDITS_FILE: &str = "tmdb_5000_credits.csv";

const MOVIES_COLUMNS: &[&str] = &["id", "title"];
const CREDITS_COLUMNS: &[&str] = &["movie_id"];

/// Parse the movies file
pub fn parse_movies(path: &Path) -> Result<Vec<RawMovieRow>> {
    let file = open(path)?;
    parse_movies_from_reader(file, &file_label(path))
}

/// Parse the credits file
pub fn parse_credits(path: &Path) -> Result<Vec<RawCreditRow>> {
    let file = open(path)?;
    parse_credits_from_reader(file, &file_label(path))
}

pub fn parse_movies_from_reader<R: Read>(reader: R, label: &str) -> Result<Vec<RawMovieRow>> {
    parse_rows(reader, label, MOVIES_COLUMNS)
}

pub fn parse_credits_from_reader<R: Read>(reader: R, label: &str) -> Result<Vec<RawCreditRow>> {
    parse_rows(reader, label, CREDITS_COLUMNS)
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_rows<R, T>(reader: R, label: &str, required: &[&str]) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| DataLoadError::Csv {
            file: label.to_string(),
            source,
        })?
        .clone();

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataLoadError::MissingColumn {
                file: label.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<T>() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            let reason = match e.kind() {
                csv::ErrorKind::Deserialize { err, .. } => Some(err.to_string()),
                _ => None,
            };
            match reason {
                Some(reason) => DataLoadError::ParseError {
                    file: label.to_string(),
                    line,
                    reason,
                },
                None => DataLoadError::Csv {
                    file: label.to_string(),
                    source: e,
                },
            }
        })?;
        rows.push(row);
    }
    Ok(rows)
}
