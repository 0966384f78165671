//! Record normalizer: turns serialized list-of-object fields into tokens.
//!
//! Each field is first read into a typed [`FieldParse`] so callers that care
//! can tell "nothing there" from "couldn't read it". The `extract_*`
//! functions collapse that into a plain token list and never fail.
//!
//! A field is all-or-nothing: one unreadable entry among the ones a function
//! looks at makes the whole field empty.

use crate::literal;
use crate::types::{JoinedRow, MovieRecord};
use serde_json::Value;
use tracing::trace;

/// Default number of top-billed cast members kept per movie
pub const TOP_CAST_LIMIT: usize = 3;

/// Crew `job` value that identifies the director
pub const DIRECTOR_JOB: &str = "Director";

/// Outcome of reading one nested field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParse {
    /// Field read successfully; tokens already have whitespace removed.
    /// `[]` in the source gives `Parsed(vec![])`.
    Parsed(Vec<String>),
    /// Field absent or blank
    Empty,
    /// Field present but unreadable or of the wrong shape
    Malformed(String),
}

impl FieldParse {
    /// Tokens of a successful parse, empty otherwise
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            FieldParse::Parsed(tokens) => tokens,
            FieldParse::Empty | FieldParse::Malformed(_) => Vec::new(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FieldParse::Malformed(_))
    }
}

/// Remove every whitespace character, so "Tom Hanks" becomes "TomHanks"
pub fn collapse_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

// =============================================================================
// Typed parsers
// =============================================================================

/// Read `raw` as a list. `Ok(None)` means the field is blank.
fn parse_list(raw: &str) -> Result<Option<Vec<Value>>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match literal::parse_value(raw) {
        Ok(Value::Array(items)) => Ok(Some(items)),
        Ok(_) => Err("expected a list".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// String field `key` of an object entry
fn string_field<'v>(entry: &'v Value, key: &str) -> Result<&'v str, String> {
    let object = entry
        .as_object()
        .ok_or_else(|| "list entry is not an object".to_string())?;
    match object.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("field '{}' is not a string", key)),
        None => Err(format!("missing field '{}'", key)),
    }
}

fn names_of<'v>(entries: impl Iterator<Item = &'v Value>) -> FieldParse {
    let mut names = Vec::new();
    for entry in entries {
        match string_field(entry, "name") {
            Ok(name) => names.push(collapse_whitespace(name)),
            Err(reason) => return FieldParse::Malformed(reason),
        }
    }
    FieldParse::Parsed(names)
}

/// Typed form of [`extract_names`]
pub fn parse_names(raw: &str) -> FieldParse {
    match parse_list(raw) {
        Ok(Some(entries)) => names_of(entries.iter()),
        Ok(None) => FieldParse::Empty,
        Err(reason) => FieldParse::Malformed(reason),
    }
}

/// Typed form of [`extract_top_cast`]
pub fn parse_top_cast(raw: &str, limit: usize) -> FieldParse {
    match parse_list(raw) {
        Ok(Some(entries)) => names_of(entries.iter().take(limit)),
        Ok(None) => FieldParse::Empty,
        Err(reason) => FieldParse::Malformed(reason),
    }
}

/// Typed form of [`extract_director`]
pub fn parse_director(raw: &str) -> FieldParse {
    let entries = match parse_list(raw) {
        Ok(Some(entries)) => entries,
        Ok(None) => return FieldParse::Empty,
        Err(reason) => return FieldParse::Malformed(reason),
    };
    for entry in &entries {
        match string_field(entry, "job") {
            Ok(DIRECTOR_JOB) => {
                return match string_field(entry, "name") {
                    Ok(name) => FieldParse::Parsed(vec![collapse_whitespace(name)]),
                    Err(reason) => FieldParse::Malformed(reason),
                };
            }
            Ok(_) => {}
            Err(reason) => return FieldParse::Malformed(reason),
        }
    }
    FieldParse::Parsed(Vec::new())
}

// =============================================================================
// Never-fail extractors
// =============================================================================

/// Every entry's `name`, in source order
pub fn extract_names(raw: &str) -> Vec<String> {
    parse_names(raw).into_tokens()
}

/// The first `limit` entries' names, in billing order
pub fn extract_top_cast(raw: &str, limit: usize) -> Vec<String> {
    parse_top_cast(raw, limit).into_tokens()
}

/// The first crew member whose job is "Director", as a 0/1 element list
pub fn extract_director(raw: &str) -> Vec<String> {
    parse_director(raw).into_tokens()
}

/// Normalize a joined row into a [`MovieRecord`] (soup left empty).
pub fn normalize_row(row: &JoinedRow) -> MovieRecord {
    let movie_id = row.movie.id;
    let field = |raw: &Option<String>, name: &str, parse: &dyn Fn(&str) -> FieldParse| {
        let parsed = parse(raw.as_deref().unwrap_or(""));
        if let FieldParse::Malformed(reason) = &parsed {
            trace!(movie_id, field = name, %reason, "Malformed nested field, using empty list");
        }
        parsed.into_tokens()
    };

    MovieRecord {
        movie_id,
        title: row.movie.title.clone(),
        genres: field(&row.movie.genres, "genres", &parse_names),
        keywords: field(&row.movie.keywords, "keywords", &parse_names),
        cast: field(&row.credits.cast, "cast", &|raw: &str| {
            parse_top_cast(raw, TOP_CAST_LIMIT)
        }),
        crew: field(&row.credits.crew, "crew", &parse_director),
        soup: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawCreditRow, RawMovieRow};

    const GENRES: &str = r#"[{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]"#;
    const CAST: &str = r#"[{"cast_id": 242, "character": "Jake Sully", "name": "Sam Worthington"},
        {"cast_id": 3, "character": "Neytiri", "name": "Zoe Saldana"},
        {"cast_id": 25, "character": "Dr. Grace Augustine", "name": "Sigourney Weaver"},
        {"cast_id": 4, "character": "Col. Quaritch", "name": "Stephen Lang"}]"#;
    const CREW: &str = r#"[{"department": "Editing", "job": "Editor", "name": "Stephen E. Rivkin"},
        {"department": "Directing", "job": "Director", "name": "James Cameron"},
        {"department": "Directing", "job": "Director", "name": "Someone Else"}]"#;

    #[test]
    fn test_extract_names_preserves_order() {
        assert_eq!(extract_names(GENRES), vec!["Action", "ScienceFiction"]);
    }

    #[test]
    fn test_tom_hanks_becomes_one_token() {
        let raw = r#"[{"name": "Tom Hanks"}, {"name": "Tim\tAllen "}]"#;
        assert_eq!(extract_names(raw), vec!["TomHanks", "TimAllen"]);
    }

    #[test]
    fn test_extract_top_cast_truncates() {
        assert_eq!(
            extract_top_cast(CAST, TOP_CAST_LIMIT),
            vec!["SamWorthington", "ZoeSaldana", "SigourneyWeaver"]
        );
        assert_eq!(extract_top_cast(CAST, 1), vec!["SamWorthington"]);
    }

    #[test]
    fn test_top_cast_ignores_entries_past_limit() {
        let raw = r#"[{"name": "A B"}, {"name": "C"}, {"name": "D"}, {"character": "no name"}]"#;
        assert_eq!(extract_top_cast(raw, 3), vec!["AB", "C", "D"]);
        assert!(parse_names(raw).is_malformed());
    }

    #[test]
    fn test_extract_director_first_match() {
        assert_eq!(extract_director(CREW), vec!["JamesCameron"]);
    }

    #[test]
    fn test_empty_crew_has_no_director() {
        assert_eq!(parse_director("[]"), FieldParse::Parsed(vec![]));
        assert!(extract_director("[]").is_empty());
    }

    #[test]
    fn test_no_director_in_crew() {
        let raw = r#"[{"job": "Producer", "name": "Jon Landau"}]"#;
        assert!(extract_director(raw).is_empty());
    }

    #[test]
    fn test_malformed_input_never_fails() {
        for raw in [
            "",
            "   ",
            "nan",
            "[{",
            "{\"name\": \"x\"}",
            "[1, 2, 3]",
            "[\"Action\"]",
            "[{\"name\": 5}]",
            "[{\"id\": 1}]",
        ] {
            assert!(extract_names(raw).is_empty(), "input {:?}", raw);
            assert!(extract_top_cast(raw, 3).is_empty(), "input {:?}", raw);
            assert!(extract_director(raw).is_empty(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_deeply_nested_input_is_malformed() {
        let raw = "[".repeat(100_000);
        assert!(extract_names(&raw).is_empty());
        assert!(extract_top_cast(&raw, 3).is_empty());
        assert!(extract_director(&raw).is_empty());
        assert!(matches!(parse_names(&raw), FieldParse::Malformed(_)));
    }

    #[test]
    fn test_typed_parse_distinguishes_empty_from_malformed() {
        assert_eq!(parse_names(""), FieldParse::Empty);
        assert_eq!(parse_names("[]"), FieldParse::Parsed(vec![]));
        assert!(parse_names("[{").is_malformed());
        assert!(parse_director("[{\"name\": \"No Job\"}]").is_malformed());
    }

    #[test]
    fn test_python_literal_fields() {
        let raw = "[{'id': 18, 'name': 'Drama'}, {'id': 10749, 'name': 'Romance'}]";
        assert_eq!(extract_names(raw), vec!["Drama", "Romance"]);
    }

    #[test]
    fn test_normalize_row() {
        let row = JoinedRow {
            movie: RawMovieRow {
                id: 19995,
                title: "Avatar".to_string(),
                genres: Some(GENRES.to_string()),
                keywords: Some(r#"[{"id": 1463, "name": "culture clash"}]"#.to_string()),
            },
            credits: RawCreditRow {
                movie_id: 19995,
                cast: Some(CAST.to_string()),
                crew: None,
            },
        };

        let record = normalize_row(&row);
        assert_eq!(record.movie_id, 19995);
        assert_eq!(record.title, "Avatar");
        assert_eq!(record.keywords, vec!["cultureclash"]);
        assert_eq!(record.cast.len(), 3);
        assert!(record.crew.is_empty());
        assert!(record.soup.is_empty());
    }
}
