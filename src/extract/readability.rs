use super::{document_title, truncate_chars, visible_text, ContentExtractor, ExtractError, Extraction};
use crate::{config::ExtractionConfig, links::ExtractionMethod};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Containers that usually hold the main article, most specific first.
const ARTICLE_SELECTORS: [&str; 4] = ["article", "main", r#"[role="main"]"#, "#content"];

/// Finds the article body of a page.
///
/// Prefers semantic containers; otherwise picks the element whose direct
/// `<p>` children carry the most text.
pub struct ReadabilityExtractor {
    config: ExtractionConfig,
}

impl ReadabilityExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    fn find_container<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        for selector in ARTICLE_SELECTORS {
            let Ok(selector) = Selector::parse(selector) else {
                continue;
            };

            let best = document
                .select(&selector)
                .map(|el| (visible_text(el).chars().count(), el))
                .max_by_key(|(len, _)| *len);

            if let Some((len, el)) = best {
                if len >= self.config.min_article_chars {
                    return Some(el);
                }
            }
        }

        let paragraph = Selector::parse("p").ok()?;
        let mut by_parent: HashMap<_, (usize, ElementRef)> = HashMap::new();
        for p in document.select(&paragraph) {
            let Some(parent_node) = p.parent() else {
                continue;
            };
            let Some(parent) = ElementRef::wrap(parent_node) else {
                continue;
            };

            let entry = by_parent.entry(parent_node.id()).or_insert((0, parent));
            entry.0 += visible_text(p).chars().count();
        }

        by_parent
            .into_values()
            .max_by_key(|(len, _)| *len)
            .map(|(_, el)| el)
    }

    fn meta_content(document: &Html, names: &[&str]) -> Option<String> {
        let selector = Selector::parse("meta").ok()?;
        document.select(&selector).find_map(|el| {
            let key = el.attr("property").or(el.attr("name")).unwrap_or_default();
            if !names.iter().any(|name| name.eq_ignore_ascii_case(key)) {
                return None;
            }
            el.attr("content")
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
        })
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str) -> Result<Extraction, ExtractError> {
        let document = Html::parse_document(html);

        let Some(container) = self.find_container(&document) else {
            return Err(ExtractError::NoContent(0));
        };

        let text_content = visible_text(container);
        let chars = text_content.chars().count();
        if chars < self.config.min_article_chars {
            return Err(ExtractError::NoContent(chars));
        }

        let title = Self::meta_content(&document, &["og:title", "twitter:title"])
            .or_else(|| document_title(&document))
            .unwrap_or_default();

        let excerpt = Self::meta_content(
            &document,
            &["description", "og:description", "twitter:description"],
        )
        .unwrap_or_else(|| truncate_chars(&text_content, self.config.excerpt_chars));

        Ok(Extraction {
            title,
            content: container.inner_html().trim().to_string(),
            text_content,
            excerpt,
            success: true,
        })
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Readability
    }

    fn name(&self) -> &'static str {
        "Readability"
    }
}
