use super::tfidf::{query_terms, word_regex};
use crate::config::HighlightConfig;
use regex::Regex;

/// Wraps whole-word query term matches in configurable markers.
pub struct Highlighter {
    matchers: Vec<Regex>,
    open: String,
    close: String,
}

impl Highlighter {
    pub fn new(query: &str, markers: &HighlightConfig) -> Self {
        Highlighter {
            matchers: query_terms(query)
                .iter()
                .filter_map(|term| word_regex(term, true).ok())
                .collect(),
            open: markers.open.clone(),
            close: markers.close.clone(),
        }
    }

    /// Terms are applied one after another, so a later term can match
    /// inside markers inserted for an earlier one.
    pub fn apply(&self, text: &str) -> String {
        if self.open.is_empty() && self.close.is_empty() {
            return text.to_string();
        }

        let mut output = text.to_string();
        for matcher in &self.matchers {
            output = matcher
                .replace_all(&output, |caps: &regex::Captures| {
                    format!("{}{}{}", self.open, &caps[0], self.close)
                })
                .into_owned();
        }
        output
    }
}
