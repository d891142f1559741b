//! Error taxonomy for the scrape and import pipelines.
//!
//! Per-article failures (`Fetch`, `Extraction`, `Upload`) are caught at the
//! article boundary and recorded in that article's result; the run continues
//! with the remaining articles. Only `Config` aborts the whole run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network, timeout, or HTTP-status failure after retries were exhausted.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The article body could not be extracted from the page.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// A Notion create/append call failed for this article.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Missing token, database id, or unreadable input. Fatal to the run.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors that are fatal to the whole run rather than to a
    /// single article.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
