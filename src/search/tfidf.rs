use super::SearchError;
use crate::links::SavedLink;
use regex::{Regex, RegexBuilder};

/// Added to a link's score for every query term found in its title.
const TITLE_BOOST: f64 = 2.0;
/// Added to a link's score for every query term found in its description.
const DESCRIPTION_BOOST: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ScoredLink<'a> {
    pub link: &'a SavedLink,
    pub score: f64,
}

/// Lowercased whitespace-separated terms, dropping single characters.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|term| term.chars().count() > 1)
        .map(String::from)
        .collect()
}

/// Whole-word matcher for a literal term.
///
/// Fails only when the compiled program exceeds the regex size limit, which a
/// very long term can do. Case folding grows the program, so scoring matches
/// lowercased text with `case_insensitive` off.
pub(super) fn word_regex(term: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(case_insensitive)
        .build()
}

/// Smoothed inverse document frequency; strictly positive for any `d <= n`.
pub fn idf(total_docs: usize, docs_with_term: usize) -> f64 {
    ((total_docs as f64 + 1.0) / (docs_with_term as f64 + 1.0)).ln() + 1.0
}

/// Rounds a score to two decimals for display.
pub fn display_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

struct Document<'a> {
    link: &'a SavedLink,
    text: String,
    word_count: usize,
}

impl<'a> Document<'a> {
    fn new(link: &'a SavedLink) -> Self {
        let text = [
            link.title.as_str(),
            link.description.as_str(),
            link.extracted_text.as_str(),
        ]
        .join(" ")
        .to_lowercase();
        let word_count = text.split_whitespace().count();

        Document {
            link,
            text,
            word_count,
        }
    }

    fn term_frequency(&self, matcher: &Regex) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        matcher.find_iter(&self.text).count() as f64 / self.word_count as f64
    }
}

/// Ranks `corpus` against `query`, best match first.
///
/// Links scoring zero are dropped. Order among equal scores is unspecified.
pub fn search<'a>(query: &str, corpus: &'a [SavedLink]) -> Result<Vec<ScoredLink<'a>>, SearchError> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return Err(SearchError::InvalidQuery);
    }

    if corpus.is_empty() {
        return Ok(vec![]);
    }

    let documents = corpus.iter().map(Document::new).collect::<Vec<_>>();

    let weighted_terms = terms
        .iter()
        .map(|term| {
            let matcher = word_regex(term, false).map_err(|err| {
                log::warn!("term of {} chars not searchable: {err}", term.chars().count());
                SearchError::TermTooLong(term.chars().count())
            })?;
            let docs_with_term = documents.iter().filter(|d| d.text.contains(term.as_str())).count();
            Ok((term, matcher, idf(documents.len(), docs_with_term)))
        })
        .collect::<Result<Vec<_>, SearchError>>()?;

    let mut results = documents
        .iter()
        .filter_map(|doc| {
            let title = doc.link.title.to_lowercase();
            let description = doc.link.description.to_lowercase();

            let mut score = 0.0;
            for (term, matcher, term_idf) in &weighted_terms {
                score += doc.term_frequency(matcher) * term_idf;

                if title.contains(term.as_str()) {
                    score += TITLE_BOOST;
                }
                if description.contains(term.as_str()) {
                    score += DESCRIPTION_BOOST;
                }
            }

            (score > 0.0).then_some(ScoredLink {
                link: doc.link,
                score,
            })
        })
        .collect::<Vec<_>>();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    log::debug!(
        "{} of {} links matched {:?}",
        results.len(),
        corpus.len(),
        terms
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, description: &str, text: &str) -> SavedLink {
        let mut link = SavedLink::new(
            &format!("https://example.com/{}", title.replace(' ', "-")),
            title,
            description,
        );
        link.extracted_text = text.to_string();
        link
    }

    fn sample_corpus() -> Vec<SavedLink> {
        vec![
            link("Rust Book", "", "systems programming language"),
            link("Go Guide", "concurrency", "goroutines and channels"),
        ]
    }

    #[test]
    fn test_query_terms() {
        assert_eq!(query_terms("  Rust  IS a Language "), vec!["rust", "is", "language"]);
        assert!(query_terms("a b c").is_empty());
        assert!(query_terms("").is_empty());
    }

    #[test]
    fn test_query_terms_counts_chars_not_bytes() {
        // "é" is two bytes but one character
        assert!(query_terms("é").is_empty());
        assert_eq!(query_terms("éa"), vec!["éa"]);
    }

    #[test]
    fn test_short_terms_are_invalid() {
        let corpus = sample_corpus();
        assert_eq!(search("a b c", &corpus).unwrap_err(), SearchError::InvalidQuery);
        assert_eq!(search("   ", &corpus).unwrap_err(), SearchError::InvalidQuery);
        assert_eq!(search("x", &[]).unwrap_err(), SearchError::InvalidQuery);
    }

    #[test]
    fn test_empty_corpus_returns_nothing() {
        assert!(search("rust", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_idf_strictly_positive() {
        for n in 0..50 {
            for d in 0..=n {
                assert!(idf(n, d) > 0.0, "idf({n}, {d}) not positive");
            }
        }
        assert_eq!(idf(4, 4), 1.0);
    }

    #[test]
    fn test_systems_scenario() {
        let corpus = sample_corpus();
        let results = search("systems", &corpus).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link.title, "Rust Book");

        // "rust book systems programming language": one hit in five words
        let expected = (1.0 / 5.0) * ((3.0f64 / 2.0).ln() + 1.0);
        assert!((results[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_go_scenario_title_boost() {
        let corpus = sample_corpus();
        let results = search("go", &corpus).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link.title, "Go Guide");
        assert!(results[0].score >= 2.0);
    }

    #[test]
    fn test_title_term_adds_at_least_two() {
        let corpus = vec![link("Kernel Notes", "", "")];
        let results = search("kernel", &corpus).unwrap();
        assert!(results[0].score >= 2.0);
    }

    #[test]
    fn test_title_boost_is_substring_based() {
        // "go" is not a whole word of "Algorithms" but still boosts
        let corpus = vec![link("Algorithms", "", "")];
        let results = search("go", &corpus).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 2.0);
    }

    #[test]
    fn test_boosts_accumulate_per_term() {
        let corpus = vec![link("Rust Async", "rust async runtime", "")];
        let results = search("rust async", &corpus).unwrap();

        // two terms, each in title (+2) and description (+1)
        assert!(results[0].score >= 6.0);
    }

    #[test]
    fn test_tf_counts_whole_words_only() {
        let corpus = vec![
            link("a", "", "cat category cat"),
            link("b", "", "nothing here"),
        ];
        let results = search("cat", &corpus).unwrap();

        assert_eq!(results.len(), 1);
        // "a cat category cat": two whole-word hits in four words
        let expected = (2.0 / 4.0) * ((3.0f64 / 2.0).ln() + 1.0);
        assert!((results[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let corpus = vec![
            link("Node", "", "learning node.js today"),
            link("Other", "", "nodexjs is not it"),
        ];
        let results = search("node.js", &corpus).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link.title, "Node");

        // must not panic on unbalanced groups or quantifiers
        assert!(search("c++ (foo [bar *", &corpus).is_ok());
    }

    #[test]
    fn test_results_sorted_descending() {
        let corpus = vec![
            link("Notes", "", "rust mentioned once among many other words here"),
            link("Rust Tutorial", "learn rust", "rust rust"),
            link("Cooking", "", "pasta"),
        ];
        let results = search("rust", &corpus).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link.title, "Rust Tutorial");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_scores_independent_of_corpus_order() {
        let mut corpus = vec![
            link("Rust Book", "", "systems programming language"),
            link("Go Guide", "concurrency", "goroutines and channels"),
            link("Systems Design", "distributed systems", "consensus and replication"),
        ];
        let forward = search("systems programming", &corpus)
            .unwrap()
            .into_iter()
            .map(|r| (r.link.url.clone(), r.score))
            .collect::<Vec<_>>();

        corpus.reverse();
        let reversed = search("systems programming", &corpus).unwrap();

        assert_eq!(forward.len(), reversed.len());
        for (url, score) in forward {
            let other = reversed.iter().find(|r| r.link.url == url).unwrap();
            assert!((other.score - score).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_document_scores_zero() {
        let mut empty = link("", "", "");
        empty.title = String::new();
        let corpus = vec![empty];
        assert!(search("anything", &corpus).unwrap().is_empty());
    }

    #[test]
    fn test_long_term_does_not_panic() {
        let corpus = sample_corpus();

        let term = "é".repeat(100_000);
        match search(&term, &corpus) {
            Ok(results) => assert!(results.is_empty()),
            Err(err) => assert_eq!(err, SearchError::TermTooLong(100_000)),
        }

        let term = "é".repeat(500_000);
        assert_eq!(
            search(&format!("rust {term}"), &corpus).unwrap_err(),
            SearchError::TermTooLong(500_000)
        );
    }

    #[test]
    fn test_scoring_matches_mixed_case_text() {
        let corpus = vec![link("Notes", "", "RUST and Rust")];
        let results = search("Rust", &corpus).unwrap();

        // "notes rust and rust": two hits in four words
        let expected = (2.0 / 4.0) * ((2.0f64 / 2.0).ln() + 1.0);
        assert!((results[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_display_score_rounds_two_decimals() {
        assert_eq!(display_score(0.28109), 0.28);
        assert_eq!(display_score(2.236), 2.24);
    }
}
