use crate::storage::{self, StorageManager};
use anyhow::{bail, Context};
use homedir::my_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_HIGHLIGHT_OPEN: &str = "**";
const DEFAULT_HIGHLIGHT_CLOSE: &str = "**";

const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_ATTEMPTS: u8 = 3;
/// Wait after a 429, multiplied by the attempt number.
const DEFAULT_RETRY_BACKOFF_MS: u64 = 4000;

/// Shortest article body the readability extractor accepts.
const DEFAULT_MIN_ARTICLE_CHARS: usize = 250;
/// Body text cap for the fallback extractor.
const DEFAULT_FALLBACK_MAX_CHARS: usize = 20_000;
const DEFAULT_EXCERPT_CHARS: usize = 150;

/// Resolves the data directory: `DEX_BASE_PATH`, else `~/.local/share/dex`.
pub fn base_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("DEX_BASE_PATH") {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let home = my_home()
        .context("couldnt read home dir")?
        .context("couldnt find home dir")?;

    Ok(home.join(".local/share/dex"))
}

/// Markers wrapped around matched terms in search output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_highlight_open")]
    pub open: String,
    #[serde(default = "default_highlight_close")]
    pub close: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            open: default_highlight_open(),
            close: default_highlight_close(),
        }
    }
}

fn default_highlight_open() -> String {
    DEFAULT_HIGHLIGHT_OPEN.to_string()
}

fn default_highlight_close() -> String {
    DEFAULT_HIGHLIGHT_CLOSE.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> u8 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_min_article_chars")]
    pub min_article_chars: usize,

    #[serde(default = "default_fallback_max_chars")]
    pub fallback_max_chars: usize,

    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_article_chars: DEFAULT_MIN_ARTICLE_CHARS,
            fallback_max_chars: DEFAULT_FALLBACK_MAX_CHARS,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

fn default_min_article_chars() -> usize {
    DEFAULT_MIN_ARTICLE_CHARS
}

fn default_fallback_max_chars() -> usize {
    DEFAULT_FALLBACK_MAX_CHARS
}

fn default_excerpt_chars() -> usize {
    DEFAULT_EXCERPT_CHARS
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&mut self) -> anyhow::Result<()> {
        if self.scrape.max_attempts == 0 {
            self.scrape.max_attempts = 1
        }

        if self.scrape.timeout_secs == 0 {
            bail!("scrape.timeout_secs must be greater than 0");
        }

        if self.extraction.fallback_max_chars == 0 {
            bail!("extraction.fallback_max_chars must be greater than 0");
        }

        if self.highlight.open.is_empty() != self.highlight.close.is_empty() {
            bail!("highlight.open and highlight.close must both be set or both be empty");
        }

        Ok(())
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    pub fn load_with(base_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base_path = base_path.into();
        let store = storage::BackendLocal::new(&base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("writing default config to {}", base_path.display());
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path;

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_with(tmp.path()).unwrap();

        assert!(tmp.path().join(CONFIG_FILE).exists());
        assert_eq!(config.highlight.open, "**");
        assert_eq!(config.extraction.fallback_max_chars, 20_000);
        assert_eq!(config.base_path(), &tmp.path().to_path_buf());
    }

    #[test]
    fn test_load_fills_missing_sections() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "highlight:\n  open: \"[\"\n  close: \"]\"\n",
        )
        .unwrap();

        let config = Config::load_with(tmp.path()).unwrap();
        assert_eq!(config.highlight.open, "[");
        assert_eq!(config.scrape.timeout_secs, DEFAULT_TIMEOUT_SECS);

        // upgraded file now carries every section
        let saved = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(saved.contains("scrape"));
        assert!(saved.contains("extraction"));
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "scrape:\n  timeout_secs: 0\n").unwrap();

        assert!(Config::load_with(tmp.path()).is_err());
    }

    #[test]
    fn test_load_rejects_half_highlight() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "highlight:\n  open: \"\"\n  close: \"]\"\n",
        )
        .unwrap();

        assert!(Config::load_with(tmp.path()).is_err());
    }
}
