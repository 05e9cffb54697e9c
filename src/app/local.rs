use crate::{
    config::Config,
    extract,
    links::{ExtractionMethod, LinkStore, SavedLink},
    scrape::{self, PageSource},
    search::{self, Highlighter},
    url_policy::is_savable_url,
};
use anyhow::anyhow;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    sync::{Arc, RwLock},
};

use super::errors::AppError;

/// Page types that are never worth saving.
const UNSAVABLE_PAGE_TYPES: [&str; 2] = ["search", "system"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LinkCreate {
    pub url: String,
    /// Overrides the extracted page title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `None` prefills from the page's meta description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SaveOpts {
    pub extract: bool,
}

impl Default for SaveOpts {
    fn default() -> Self {
        Self { extract: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedLink {
    pub link: SavedLink,
    pub score: f64,
}

/// What a page would be saved as, read from its meta tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDraft {
    pub url: String,
    pub title: String,
    pub description: String,
    pub page_type: String,
    pub already_saved: bool,
}

pub struct AppLocal {
    pub link_mgr: Arc<dyn LinkStore>,
    page_source: Arc<dyn PageSource>,
    config: Arc<RwLock<Config>>,
}

impl AppLocal {
    pub fn new(
        link_mgr: Arc<dyn LinkStore>,
        page_source: Arc<dyn PageSource>,
        config: Arc<RwLock<Config>>,
    ) -> Self {
        Self {
            link_mgr,
            page_source,
            config,
        }
    }

    fn config(&self) -> Result<Config, AppError> {
        let config = self
            .config
            .read()
            .map_err(|_| anyhow!("config lock poisoned"))?;
        Ok(config.clone())
    }

    pub fn highlighter(&self, query: &str) -> Result<Highlighter, AppError> {
        Ok(Highlighter::new(query, &self.config()?.highlight))
    }

    fn is_saved(&self, url: &str) -> Result<bool, AppError> {
        Ok(self.link_mgr.get_all()?.iter().any(|l| l.url == url))
    }

    /// Fetches the page, extracts its text and stores a new link.
    ///
    /// Fetch or extraction failures still save the link, tagged with
    /// [`ExtractionMethod::Error`].
    pub fn save(&self, link_create: LinkCreate, opts: SaveOpts) -> Result<SavedLink, AppError> {
        let url = link_create.url.trim().to_string();

        if !is_savable_url(&url) {
            return Err(AppError::InvalidUrl(url));
        }

        if self.is_saved(&url)? {
            return Err(AppError::AlreadySaved(url));
        }

        let mut link = SavedLink::new(
            &url,
            link_create.title.as_deref().unwrap_or_default(),
            link_create.description.as_deref().unwrap_or_default(),
        );

        if opts.extract {
            let config = self.config()?;
            match self.page_source.fetch(&url) {
                Ok(html) => {
                    match extract::extract_with_fallback(&html, &config.extraction) {
                        Ok((extraction, method)) => {
                            if link_create.title.is_none() && !extraction.title.is_empty() {
                                link.title = extraction.title;
                            }
                            link.extracted_content = extraction.content;
                            link.extracted_text = extraction.text_content;
                            link.excerpt = extraction.excerpt;
                            link.extraction_method = method;
                        }
                        Err(err) => {
                            log::warn!("{url}: saving without content: {err}");
                            link.extraction_error = Some(err.to_string());
                        }
                    }

                    if link_create.description.is_none() {
                        if let Some(description) = scrape::get_data_from_page(&html).description {
                            link.description = description;
                        }
                    }
                }
                Err(err) => {
                    log::warn!("{url}: saving without content: {err}");
                    link.extraction_error = Some(err.to_string());
                }
            }
        } else {
            link.extraction_error = Some("extraction skipped".to_string());
        }

        if !self.link_mgr.upsert_if_absent(link.clone())? {
            return Err(AppError::AlreadySaved(url));
        }

        log::info!(
            "saved {url} ({}, {} chars)",
            link.extraction_method,
            link.extracted_text.len()
        );

        Ok(link)
    }

    /// Ranks every saved link against `query`.
    pub fn search(&self, query: &str) -> Result<Vec<RankedLink>, AppError> {
        let corpus = self.link_mgr.get_all()?;

        let ranked = search::search(query, &corpus)?
            .into_iter()
            .map(|scored| RankedLink {
                link: scored.link.clone(),
                score: scored.score,
            })
            .collect();

        Ok(ranked)
    }

    /// All links, newest first.
    pub fn list(&self, unread_only: bool) -> Result<Vec<SavedLink>, AppError> {
        let mut links = self.link_mgr.get_all()?;
        if unread_only {
            links.retain(|l| !l.read);
        }
        links.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(links)
    }

    pub fn random(&self) -> Result<Option<SavedLink>, AppError> {
        let links = self.link_mgr.get_all()?;
        Ok(links.choose(&mut rand::rng()).cloned())
    }

    pub fn set_read(&self, url: &str, read: bool) -> Result<(), AppError> {
        let url = url.trim();
        if !self.link_mgr.set_read(url, read)? {
            return Err(AppError::NotFound(url.to_string()));
        }
        Ok(())
    }

    /// Returns whether a link was removed; unknown urls are not an error.
    pub fn delete(&self, url: &str) -> Result<bool, AppError> {
        let url = url.trim();
        let removed = self.link_mgr.delete_by_url(url)?;
        if !removed {
            log::debug!("{url} was not saved, nothing to delete");
        }
        Ok(removed)
    }

    /// Writes every link as a pretty JSON array, returning how many.
    pub fn export(&self, path: &Path) -> Result<usize, AppError> {
        let links = self.link_mgr.get_all()?;
        if links.is_empty() {
            return Err(AppError::NothingToExport);
        }

        let data = serde_json::to_vec_pretty(&links)?;
        std::fs::write(path, data)?;

        log::info!("exported {} links to {}", links.len(), path.display());
        Ok(links.len())
    }

    /// Replaces the store with the links of an exported JSON array.
    pub fn import(&self, path: &Path) -> Result<usize, AppError> {
        let data = std::fs::read(path)?;
        let mut links: Vec<SavedLink> = serde_json::from_slice(&data)?;
        links.iter_mut().for_each(SavedLink::normalize);

        self.link_mgr.replace_all(links)?;

        let count = self.link_mgr.get_all()?.len();
        log::info!("imported {count} links from {}", path.display());
        Ok(count)
    }

    /// Reads a page's meta tags to prefill a new link.
    ///
    /// Returns `None` for urls and pages that should not be saved.
    pub fn refresh(&self, url: &str) -> Result<Option<PageDraft>, AppError> {
        let url = url.trim();
        if !is_savable_url(url) {
            log::debug!("{url}: not a savable url");
            return Ok(None);
        }

        let html = match self.page_source.fetch(url) {
            Ok(html) => html,
            Err(err) => {
                log::warn!("{url}: {err}");
                return Ok(None);
            }
        };

        let meta = scrape::get_data_from_page(&html);
        if UNSAVABLE_PAGE_TYPES.contains(&meta.page_type.as_str()) {
            log::debug!("{url}: skipping page of type {}", meta.page_type);
            return Ok(None);
        }

        Ok(Some(PageDraft {
            url: url.to_string(),
            title: meta.title.unwrap_or_else(|| url.to_string()),
            description: meta.description.unwrap_or_default(),
            page_type: meta.page_type,
            already_saved: self.is_saved(url)?,
        }))
    }
}

/// Tags links saved without any extracted text.
pub fn is_contentless(link: &SavedLink) -> bool {
    link.extraction_method == ExtractionMethod::Error || link.extracted_text.is_empty()
}
