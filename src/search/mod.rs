//! Relevance search over saved links.
//!
//! Ranking is a TF-IDF variant with flat boosts for title and description
//! hits. Everything here is a pure function of `(query, corpus)`: the caller
//! hands in a snapshot of the store and gets back borrowed, scored links.
//!
//! - `tfidf`: tokenization, term frequency, inverse document frequency, ranking
//! - `highlight`: whole-word term marking for display

mod highlight;
mod tfidf;

pub use highlight::Highlighter;
pub use tfidf::{display_score, search, ScoredLink};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("query has no usable terms (terms must be longer than one character)")]
    InvalidQuery,

    #[error("query term of {0} characters is too long to match")]
    TermTooLong(usize),
}
