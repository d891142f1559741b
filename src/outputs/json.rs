//! JSON run index written next to the Markdown output.
//!
//! `parsed_articles.json` holds every record of the run, failures included,
//! so the import stage can re-associate Markdown files with their source
//! URLs and dates.

use crate::error::Result;
use crate::models::ArticleRecord;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Write all records of a run as a pretty-printed JSON array.
pub async fn write_records(records: &[ArticleRecord], path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).await?;
    info!(path, count = records.len(), "Wrote JSON index");
    Ok(())
}

/// Recreate the Markdown output directory from scratch.
///
/// Stale files from a previous run would otherwise survive and be picked up
/// by the importer.
pub async fn reset_markdown_dir(dir: &str) -> Result<()> {
    if Path::new(dir).exists() {
        fs::remove_dir_all(dir).await?;
    }
    fs::create_dir_all(dir).await?;
    Ok(())
}
