//! Soup builder.
//!
//! A movie's soup is the single document the vectorizer sees:
//! keywords, cast, crew and genres, in that order. Tokens inside a group are
//! space-joined and the four groups are separated by one space each, even
//! when a group is empty. The overview is not part of the soup.

use data_loader::{Corpus, MovieRecord};

/// Build the soup for one record
pub fn build_soup(record: &MovieRecord) -> String {
    [
        record.keywords.join(" "),
        record.cast.join(" "),
        record.crew.join(" "),
        record.genres.join(" "),
    ]
    .join(" ")
}

/// Fill in `soup` for every record of the corpus
pub fn fill_soups(corpus: &mut Corpus) {
    for record in corpus.records_mut() {
        record.soup = build_soup(record);
    }
}
