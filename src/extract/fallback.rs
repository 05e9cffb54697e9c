use super::{document_title, truncate_chars, visible_text, ContentExtractor, ExtractError, Extraction};
use crate::{config::ExtractionConfig, links::ExtractionMethod};
use scraper::{Html, Selector};

/// Takes the whole body text when no article could be found.
pub struct FallbackExtractor {
    config: ExtractionConfig,
}

impl FallbackExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl ContentExtractor for FallbackExtractor {
    fn extract(&self, html: &str) -> Result<Extraction, ExtractError> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("body").map_err(|_| ExtractError::NoBody)?;
        let body = document.select(&selector).next().ok_or(ExtractError::NoBody)?;

        let text = truncate_chars(&visible_text(body), self.config.fallback_max_chars);

        Ok(Extraction {
            title: document_title(&document).unwrap_or_default(),
            content: text.clone(),
            excerpt: truncate_chars(&text, self.config.excerpt_chars),
            text_content: text,
            success: false,
        })
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Fallback
    }

    fn name(&self) -> &'static str {
        "Fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_is_truncated() {
        let html = format!("<html><body><div>{}</div></body></html>", "abcd ".repeat(50));
        let extractor = FallbackExtractor::new(ExtractionConfig {
            fallback_max_chars: 12,
            excerpt_chars: 4,
            ..Default::default()
        });

        let extraction = extractor.extract(&html).unwrap();
        assert_eq!(extraction.text_content, "abcd abcd ab");
        assert_eq!(extraction.content, extraction.text_content);
        assert_eq!(extraction.excerpt, "abcd");
        assert!(!extraction.success);
    }

    #[test]
    fn test_fragment_still_has_body() {
        // html5ever synthesizes <body> for bare fragments
        let extraction = FallbackExtractor::new(ExtractionConfig::default())
            .extract("just some text")
            .unwrap();
        assert_eq!(extraction.text_content, "just some text");
        assert_eq!(extraction.title, "");
    }
}
