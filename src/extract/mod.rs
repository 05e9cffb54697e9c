//! Readable text extraction from fetched HTML.
//!
//! Two strategies implement [`ContentExtractor`]: a readability-style article
//! finder and a raw body-text fallback. [`extract_with_fallback`] runs them in
//! order and tags the outcome with the [`ExtractionMethod`] that produced it.

mod fallback;
mod readability;

use crate::{config::ExtractionConfig, links::ExtractionMethod};
use scraper::{node::Node, ElementRef};

pub use fallback::FallbackExtractor;
pub use readability::ReadabilityExtractor;

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: [&str; 10] = [
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form", "svg",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub title: String,
    /// Article body as extracted: markup for rich extraction, text otherwise.
    pub content: String,
    pub text_content: String,
    pub excerpt: String,
    pub success: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("no readable content found ({0} chars)")]
    NoContent(usize),

    #[error("document has no body")]
    NoBody,
}

pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<Extraction, ExtractError>;

    fn method(&self) -> ExtractionMethod;

    fn name(&self) -> &'static str;
}

/// Runs the readability extractor and falls back to raw body text on error.
pub fn extract_with_fallback(
    html: &str,
    config: &ExtractionConfig,
) -> Result<(Extraction, ExtractionMethod), ExtractError> {
    let extractors: [Box<dyn ContentExtractor>; 2] = [
        Box::new(ReadabilityExtractor::new(config.clone())),
        Box::new(FallbackExtractor::new(config.clone())),
    ];

    let mut last_err = ExtractError::NoBody;
    for extractor in extractors {
        match extractor.extract(html) {
            Ok(extraction) => {
                log::debug!(
                    "{} extracted {} chars (article found: {})",
                    extractor.name(),
                    extraction.text_content.len(),
                    extraction.success
                );
                return Ok((extraction, extractor.method()));
            }
            Err(err) => {
                log::warn!("{} extraction failed: {err}", extractor.name());
                last_err = err;
            }
        }
    }

    Err(last_err)
}

/// Visible text below `element`, whitespace collapsed to single spaces.
pub(crate) fn visible_text(element: ElementRef) -> String {
    let mut words = Vec::new();

    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub(crate) fn document_title(document: &scraper::Html) -> Option<String> {
    let selector = scraper::Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}
