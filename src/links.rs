use crate::storage::{BackendLocal, StorageManager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fmt::Display,
    sync::{Arc, RwLock},
    time::Instant,
};

pub const LINKS_FILE: &str = "links.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Readability,
    Fallback,
    #[default]
    Error,
}

impl Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Readability => write!(f, "readability"),
            ExtractionMethod::Fallback => write!(f, "fallback"),
            ExtractionMethod::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLink {
    pub url: String,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub extracted_content: String,
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub excerpt: String,

    pub date_added: DateTime<Utc>,

    #[serde(default)]
    pub extraction_method: ExtractionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,

    #[serde(default)]
    pub read: bool,
}

impl SavedLink {
    pub fn new(url: &str, title: &str, description: &str) -> Self {
        SavedLink {
            url: url.to_string(),
            title: if title.is_empty() {
                url.to_string()
            } else {
                title.to_string()
            },
            description: description.to_string(),
            extracted_content: String::new(),
            extracted_text: String::new(),
            excerpt: String::new(),
            date_added: Utc::now(),
            extraction_method: ExtractionMethod::Error,
            extraction_error: None,
            read: false,
        }
    }

    /// Older exports stored plain text under `extractedContent` only.
    pub fn normalize(&mut self) {
        if self.extracted_text.is_empty()
            && !self.extracted_content.is_empty()
            && !self.extracted_content.trim_start().starts_with('<')
        {
            self.extracted_text = self.extracted_content.clone();
        }

        if self.title.is_empty() {
            self.title = self.url.clone();
        }
    }
}

/// Durable collection of saved links keyed by url.
pub trait LinkStore: Send + Sync {
    fn get_all(&self) -> anyhow::Result<Vec<SavedLink>>;
    /// Returns `false` without touching the store if the url is already saved.
    fn upsert_if_absent(&self, link: SavedLink) -> anyhow::Result<bool>;
    /// Returns `false` if no link has this url.
    fn set_read(&self, url: &str, read: bool) -> anyhow::Result<bool>;
    /// Returns `false` if no link has this url.
    fn delete_by_url(&self, url: &str) -> anyhow::Result<bool>;
    fn replace_all(&self, links: Vec<SavedLink>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct BackendJson {
    list: Arc<RwLock<Vec<SavedLink>>>,
    storage: BackendLocal,
}

impl BackendJson {
    pub fn load(storage: BackendLocal) -> anyhow::Result<Self> {
        if !storage.exists(LINKS_FILE) {
            log::info!(
                "Creating new database at {}",
                storage.base_dir.join(LINKS_FILE).display()
            );
            storage.write(LINKS_FILE, b"[]")?;
        }

        let now = Instant::now();
        let bytes = storage.read(LINKS_FILE)?;
        let links: Vec<SavedLink> = serde_json::from_slice(&bytes)?;

        log::debug!(
            "took {}ms to read {} links",
            now.elapsed().as_micros() as f64 / 1000.0,
            links.len()
        );

        Ok(BackendJson {
            list: Arc::new(RwLock::new(links)),
            storage,
        })
    }

    fn save(&self, links: &[SavedLink]) -> anyhow::Result<()> {
        let data = serde_json::to_vec_pretty(links)?;
        self.storage.write(LINKS_FILE, &data)?;
        Ok(())
    }

    fn write_lock(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, Vec<SavedLink>>> {
        self.list
            .write()
            .map_err(|_| anyhow::anyhow!("link list lock poisoned"))
    }
}

impl LinkStore for BackendJson {
    fn get_all(&self) -> anyhow::Result<Vec<SavedLink>> {
        let links = self
            .list
            .read()
            .map_err(|_| anyhow::anyhow!("link list lock poisoned"))?;
        Ok(links.clone())
    }

    fn upsert_if_absent(&self, link: SavedLink) -> anyhow::Result<bool> {
        let mut links = self.write_lock()?;

        if links.iter().any(|l| l.url == link.url) {
            log::debug!("{} already saved", link.url);
            return Ok(false);
        }

        links.push(link);
        self.save(&links)?;

        Ok(true)
    }

    fn set_read(&self, url: &str, read: bool) -> anyhow::Result<bool> {
        let mut links = self.write_lock()?;

        let Some(link) = links.iter_mut().find(|l| l.url == url) else {
            return Ok(false);
        };

        if link.read != read {
            link.read = read;
            self.save(&links)?;
        }

        Ok(true)
    }

    fn delete_by_url(&self, url: &str) -> anyhow::Result<bool> {
        let mut links = self.write_lock()?;

        let Some(idx) = links.iter().position(|l| l.url == url) else {
            return Ok(false);
        };

        links.remove(idx);
        self.save(&links)?;

        Ok(true)
    }

    fn replace_all(&self, new_links: Vec<SavedLink>) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        let mut new_links = new_links;
        new_links.retain(|l| seen.insert(l.url.clone()));

        let mut links = self.write_lock()?;
        *links = new_links;
        self.save(&links)
    }
}
