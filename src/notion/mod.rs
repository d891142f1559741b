//! Notion import: REST client, block conversion, and property mapping.
//!
//! An upload moves through pending → page created → blocks appended; there
//! is no rollback, so a failure mid-append leaves a partial page behind and
//! the article is reported as failed. Articles upload sequentially.

use crate::error::Result;
use serde_json::Value;
use tracing::debug;

pub mod blocks;
pub mod client;
pub mod properties;

pub use client::NotionClient;

/// Create a page for one article and append any overflow block batches.
///
/// Returns the id of the created page.
pub async fn upload_article(
    client: &NotionClient,
    database_id: &str,
    page_properties: Value,
    body_blocks: Vec<Value>,
) -> Result<String> {
    let (initial, appends) = blocks::split_for_upload(body_blocks);
    let page_id = client.create_page(database_id, page_properties, initial).await?;
    for (i, batch) in appends.into_iter().enumerate() {
        debug!(page_id = %page_id, batch = i + 1, "Appending overflow blocks");
        client.append_blocks(&page_id, batch).await?;
    }
    Ok(page_id)
}
