use crate::search::SearchError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("link not found: {0}")]
    NotFound(String),

    #[error("this url is already saved: {0}")]
    AlreadySaved(String),

    #[error("invalid url, please enter a valid web address: {0:?}")]
    InvalidUrl(String),

    #[error("no links to export")]
    NothingToExport,

    #[error("{0}")]
    Search(#[from] SearchError),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("json error: {0:?}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
