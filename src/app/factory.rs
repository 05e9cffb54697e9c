use crate::{
    app::local::AppLocal,
    config::{self, Config},
    links::BackendJson,
    scrape::HttpPageSource,
    storage,
};
use anyhow::{Context, Result};
use std::{
    path::Path,
    sync::{Arc, RwLock},
};

/// Wires config, store and page source for a data directory.
pub struct AppFactory;

impl AppFactory {
    pub fn create_local_app(base_path: &Path) -> Result<AppLocal> {
        std::fs::create_dir_all(base_path)
            .context("Failed to create application base directory")?;

        let config = Config::load_with(base_path)?;
        log::debug!("config loaded from {}", config.base_path().display());
        let page_source = Arc::new(HttpPageSource::new(config.scrape.clone()));

        let storage = storage::BackendLocal::new(base_path)?;
        let link_mgr = Arc::new(BackendJson::load(storage).context("Failed to load links")?);

        Ok(AppLocal::new(
            link_mgr,
            page_source,
            Arc::new(RwLock::new(config)),
        ))
    }

    pub fn create_default_app() -> Result<AppLocal> {
        let base_path = config::base_path()?;
        log::debug!("using data directory {}", base_path.display());
        Self::create_local_app(&base_path)
    }
}
