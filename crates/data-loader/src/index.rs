//! Corpus loading and title lookup.
//!
//! This module turns the two parsed CSV files into the query-ready pieces:
//! - inner join of movies and credits on the movie id
//! - parallel normalization of every joined row
//! - the [`TitleIndex`] used to resolve a title to its row

use crate::error::{DataLoadError, Result};
use crate::normalizer::normalize_row;
use crate::parser::{self, CREDITS_FILE, MOVIES_FILE};
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Subdirectory checked when the files are not directly in the data dir
pub const FALLBACK_SUBDIR: &str = "movie-recommender";

/// Locations of the two input files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub movies: PathBuf,
    pub credits: PathBuf,
}

impl DatasetPaths {
    /// Find the dataset in `data_dir`, then in `data_dir/movie-recommender`.
    pub fn resolve(data_dir: &Path) -> Result<Self> {
        for dir in [data_dir.to_path_buf(), data_dir.join(FALLBACK_SUBDIR)] {
            let movies = dir.join(MOVIES_FILE);
            let credits = dir.join(CREDITS_FILE);
            if movies.is_file() && credits.is_file() {
                return Ok(Self { movies, credits });
            }
        }
        Err(DataLoadError::FileNotFound {
            path: data_dir.join(MOVIES_FILE).display().to_string(),
        })
    }
}

impl Corpus {
    /// Load, join and normalize the TMDB dataset found under `data_dir`.
    ///
    /// Soups are not built here; that is the pipeline's job.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let paths = DatasetPaths::resolve(data_dir)?;
        Self::load_from_files(&paths)
    }

    pub fn load_from_files(paths: &DatasetPaths) -> Result<Self> {
        info!(
            movies = %paths.movies.display(),
            credits = %paths.credits.display(),
            "Loading TMDB dataset"
        );

        let (movies, credits) = rayon::join(
            || parser::parse_movies(&paths.movies),
            || parser::parse_credits(&paths.credits),
        );
        let movies = movies?;
        let credits = credits?;
        info!("Parsed {} movie rows and {} credit rows", movies.len(), credits.len());

        let joined = join_rows(movies, credits);
        let corpus = Self::from_joined(&joined);
        if corpus.is_empty() {
            return Err(DataLoadError::ValidationError(
                "no movie has a matching credits row".to_string(),
            ));
        }

        info!("Corpus ready with {} movies", corpus.len());
        Ok(corpus)
    }

    /// Normalize already-joined rows, keeping their order
    pub fn from_joined(rows: &[JoinedRow]) -> Self {
        let records: Vec<MovieRecord> = rows.par_iter().map(normalize_row).collect();
        Self::new(records)
    }
}

/// Inner join on movie id.
///
/// Output follows the movies file order; a movie with several credit rows
/// appears once per credit row, and a movie with none is dropped.
pub fn join_rows(movies: Vec<RawMovieRow>, credits: Vec<RawCreditRow>) -> Vec<JoinedRow> {
    join_rows_counted(movies, credits).0
}

/// [`join_rows`] plus the number of movies dropped for having no credits
fn join_rows_counted(
    movies: Vec<RawMovieRow>,
    credits: Vec<RawCreditRow>,
) -> (Vec<JoinedRow>, usize) {
    let mut by_movie: HashMap<MovieId, Vec<RawCreditRow>> = HashMap::new();
    for credit in credits {
        by_movie.entry(credit.movie_id).or_default().push(credit);
    }

    let mut joined = Vec::with_capacity(movies.len());
    let mut dropped = 0;
    for movie in movies {
        match by_movie.get(&movie.id) {
            Some(matches) => {
                for credits in matches {
                    joined.push(JoinedRow {
                        movie: movie.clone(),
                        credits: credits.clone(),
                    });
                }
            }
            None => dropped += 1,
        }
    }

    debug!(
        "Joined {} rows ({} movies without credits dropped)",
        joined.len(),
        dropped
    );
    (joined, dropped)
}

// =============================================================================
// TitleIndex
// =============================================================================

/// Title to row lookup plus the full title catalog.
///
/// When titles collide, the first row with that title wins. The catalog keeps
/// every title in corpus order, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    titles: Vec<String>,
    rows: HashMap<String, RowIndex>,
}

impl TitleIndex {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let titles: Vec<String> = corpus.iter().map(|m| m.title.clone()).collect();
        let mut rows = HashMap::with_capacity(titles.len());
        for (row, title) in titles.iter().enumerate() {
            rows.entry(title.clone()).or_insert(row);
        }
        Self { titles, rows }
    }

    /// Row of the first movie with exactly this title
    pub fn get(&self, title: &str) -> Option<RowIndex> {
        self.rows.get(title).copied()
    }

    /// All titles in corpus order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Number of distinct titles
    pub fn distinct_len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn movie(id: MovieId, title: &str) -> RawMovieRow {
        RawMovieRow {
            id,
            title: title.to_string(),
            genres: None,
            keywords: None,
        }
    }

    fn credit(movie_id: MovieId, crew: &str) -> RawCreditRow {
        RawCreditRow {
            movie_id,
            cast: None,
            crew: Some(crew.to_string()),
        }
    }

    #[test]
    fn test_inner_join_keeps_movie_order() {
        let movies = vec![movie(3, "C"), movie(1, "A"), movie(2, "B")];
        let credits = vec![credit(1, "[]"), credit(3, "[]"), credit(99, "[]")];

        let joined = join_rows(movies, credits);
        let ids: Vec<MovieId> = joined.iter().map(|r| r.movie.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_join_duplicates_credit_matches() {
        let joined = join_rows(
            vec![movie(1, "A")],
            vec![credit(1, "[]"), credit(1, r#"[{"job": "Director", "name": "X Y"}]"#)],
        );
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[1].credits.crew.as_deref().map(|c| c.contains("X Y")), Some(true));
    }

    #[test]
    fn test_dropped_count_ignores_duplicate_credits() {
        let (joined, dropped) = join_rows_counted(
            vec![movie(1, "A"), movie(2, "B")],
            vec![credit(1, "[]"), credit(1, "[]"), credit(1, "[]")],
        );
        assert_eq!(joined.len(), 3);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_title_index_first_occurrence_wins() {
        let corpus = Corpus::new(vec![
            MovieRecord::new(10, "The Host"),
            MovieRecord::new(11, "Alien"),
            MovieRecord::new(12, "The Host"),
        ]);
        let index = TitleIndex::from_corpus(&corpus);

        assert_eq!(index.get("The Host"), Some(0));
        assert_eq!(index.get("Alien"), Some(1));
        assert_eq!(index.get("Nope"), None);
        assert_eq!(index.titles().len(), 3);
        assert_eq!(index.distinct_len(), 2);
    }

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_from_dir_with_fallback_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join(FALLBACK_SUBDIR);
        std::fs::create_dir(&sub).unwrap();

        write_file(
            &sub,
            MOVIES_FILE,
            "id,title,genres,keywords\n\
             1,Toy Story,\"[{\"\"name\"\": \"\"Animation\"\"}]\",\"[{\"\"name\"\": \"\"toy\"\"}]\"\n\
             2,No Credits,[],[]\n",
        );
        write_file(
            &sub,
            CREDITS_FILE,
            "movie_id,title,cast,crew\n\
             1,Toy Story,\"[{\"\"name\"\": \"\"Tom Hanks\"\"}]\",\"[{\"\"job\"\": \"\"Director\"\", \"\"name\"\": \"\"John Lasseter\"\"}]\"\n",
        );

        let corpus = Corpus::load_from_dir(dir.path()).unwrap();
        assert_eq!(corpus.len(), 1);

        let toy_story = corpus.get(0).unwrap();
        assert_eq!(toy_story.genres, vec!["Animation"]);
        assert_eq!(toy_story.keywords, vec!["toy"]);
        assert_eq!(toy_story.cast, vec!["TomHanks"]);
        assert_eq!(toy_story.crew, vec!["JohnLasseter"]);
    }

    #[test]
    fn test_load_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_with_no_matches_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), MOVIES_FILE, "id,title\n1,A\n");
        write_file(dir.path(), CREDITS_FILE, "movie_id,cast,crew\n2,[],[]\n");

        let err = Corpus::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(_)));
    }
}
