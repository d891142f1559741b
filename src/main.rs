//! # news_to_notion
//!
//! A two-stage pipeline that scrapes news articles into clean Markdown and
//! imports them as pages into a Notion database.
//!
//! ## Features
//!
//! - Dedicated extraction profiles for vc.ru, TechCrunch, Habr, Crunchbase
//!   News, and InfoQ, plus a heuristic fallback for everything else
//! - Concurrent fetching with jittered dispatch and bounded 403/timeout
//!   retries
//! - Per-article Markdown files plus a `parsed_articles.json` run index
//! - Notion import that respects the 100-blocks-per-request API ceiling
//!
//! ## Usage
//!
//! ```sh
//! news_to_notion parse https://vc.ru/media/999 --file urls.txt
//! news_to_notion import --field-map fields.yaml
//! ```

use clap::Parser;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod cli;
mod error;
mod extractors;
mod fetch;
mod models;
mod notion;
mod outputs;
mod utils;

use cli::{Cli, Command};
use error::{Error, Result};
use fetch::{Fetcher, dispatch_jitter};
use models::{ArticleRecord, ArticleStatus, SiteType};
use notion::NotionClient;
use notion::{blocks, properties};
use outputs::{json, markdown};
use utils::extract_urls_from_line;

const MAX_CONCURRENT: usize = 50;

#[tokio::main]
async fn main() {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Parse { urls, file, concurrent, json_output, markdown_dir } => {
            run_parse(urls, file, concurrent, &json_output, &markdown_dir).await
        }
        Command::Import { token, database_id, markdown_dir, json_file, field_map } => {
            run_import(token, database_id, &markdown_dir, &json_file, field_map).await
        }
    };

    if let Err(e) = outcome {
        error!(error = %e, fatal = e.is_fatal(), "Run failed");
        std::process::exit(1);
    }
}

async fn run_parse(
    urls: Vec<String>,
    file: Option<String>,
    concurrent: usize,
    json_output: &str,
    markdown_dir: &str,
) -> Result<()> {
    let start_time = std::time::Instant::now();

    let urls = gather_urls(urls, file.as_deref()).await?;
    if urls.is_empty() {
        return Err(Error::Config("no URLs to process".into()));
    }
    let concurrent = concurrent.clamp(1, MAX_CONCURRENT);
    info!(count = urls.len(), concurrent, "Starting article parsing");

    let fetcher = Fetcher::new()?;
    let mut indexed: Vec<(usize, ArticleRecord)> = stream::iter(urls.iter().enumerate())
        .map(|(i, url)| {
            let fetcher = fetcher.clone();
            async move {
                // Spread out the initial burst of requests.
                tokio::time::sleep(dispatch_jitter()).await;
                debug!(index = i, %url, "Processing article");
                (i, process_url(&fetcher, url).await)
            }
        })
        .buffer_unordered(concurrent)
        .collect()
        .await;

    // Restore input order so file numbering matches the record array.
    indexed.sort_by_key(|(i, _)| *i);
    let records: Vec<ArticleRecord> = indexed.into_iter().map(|(_, r)| r).collect();

    json::reset_markdown_dir(markdown_dir).await?;
    for (i, record) in records.iter().enumerate() {
        if record.status != ArticleStatus::Success {
            continue;
        }
        let file_name = markdown::file_name(i + 1, record);
        let path = Path::new(markdown_dir).join(&file_name);
        tokio::fs::write(&path, markdown::render(record)).await?;
        debug!(path = %path.display(), "Wrote Markdown");
    }
    json::write_records(&records, json_output).await?;

    let successful = records.iter().filter(|r| r.status == ArticleStatus::Success).count();
    let failed = records.len() - successful;
    for record in records.iter().filter(|r| r.status == ArticleStatus::Error) {
        warn!(url = %record.url, detail = ?record.error_detail, "Article failed");
    }
    info!(
        total = records.len(),
        successful,
        failed,
        elapsed_secs = start_time.elapsed().as_secs(),
        "Parsing complete"
    );
    Ok(())
}

/// Fetch and extract one article. Failures become error records, never
/// errors: one bad URL must not take the batch down.
async fn process_url(fetcher: &Fetcher, url: &str) -> ArticleRecord {
    let site_type = SiteType::classify(url);
    let parsed_url = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => return ArticleRecord::failed(url, site_type, format!("invalid URL: {e}")),
    };

    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => return ArticleRecord::failed(url, site_type, e.to_string()),
    };

    match extractors::extract(site_type, &html, &parsed_url) {
        Ok(extracted) => ArticleRecord {
            url: url.to_string(),
            site_type,
            title: extracted.title,
            date: extracted.date,
            body: extracted.blocks,
            images: extracted.images,
            status: ArticleStatus::Success,
            error_detail: None,
        },
        Err(e) => ArticleRecord::failed(url, site_type, e.to_string()),
    }
}

/// Combine positional URLs with the contents of an optional URL list file.
///
/// File lines may carry prose around the link; blank lines and `#` comments
/// are ignored.
async fn gather_urls(urls: Vec<String>, file: Option<&str>) -> Result<Vec<String>> {
    let mut gathered = urls;
    if let Some(path) = file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("cannot read URL file {path}: {e}")))?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            gathered.extend(extract_urls_from_line(line));
        }
    }
    Ok(gathered)
}

async fn run_import(
    token: Option<String>,
    database_id: Option<String>,
    markdown_dir: &str,
    json_file: &str,
    field_map: Option<String>,
) -> Result<()> {
    let token = token
        .ok_or_else(|| Error::Config("Notion token missing: pass it or set NOTION_TOKEN".into()))?;
    let database_id = database_id.ok_or_else(|| {
        Error::Config("database id missing: pass it or set NOTION_DATABASE_ID".into())
    })?;

    let client = NotionClient::new(&token)?;
    let schema = client.retrieve_database(&database_id).await?;
    info!(properties = schema.len(), "Retrieved database schema");

    let field_map = match field_map {
        Some(path) => properties::load_field_map(&path).await?,
        None => Vec::new(),
    };

    let records = load_records(json_file).await;
    let files = markdown_files(markdown_dir).await?;
    if files.is_empty() {
        warn!(dir = markdown_dir, "No Markdown files to import");
        return Ok(());
    }
    info!(count = files.len(), "Starting Notion import");

    let mut imported = 0usize;
    let mut failed = 0usize;
    for file_name in &files {
        let path = Path::new(markdown_dir).join(file_name);
        let (page_properties, body_blocks) =
            match prepare_import(&path, file_name, &records, &schema, &field_map).await {
                Ok(prepared) => prepared,
                Err(e) => {
                    failed += 1;
                    warn!(file = %file_name, error = %e, "Skipping file");
                    continue;
                }
            };
        match notion::upload_article(&client, &database_id, page_properties, body_blocks).await {
            Ok(page_id) => {
                imported += 1;
                info!(file = %file_name, %page_id, "Imported article");
            }
            Err(e) => {
                failed += 1;
                warn!(file = %file_name, error = %e, "Import failed for article");
            }
        }
    }

    info!(imported, failed, total = files.len(), "Import complete");
    Ok(())
}

/// Read one Markdown file and turn it into its page properties and body
/// blocks. Any failure here (unreadable file, no usable title) is an error
/// for this article only; the import loop records it and moves on.
async fn prepare_import(
    path: &Path,
    file_name: &str,
    records: &[ArticleRecord],
    schema: &HashMap<String, String>,
    field_map: &[properties::FieldMapEntry],
) -> Result<(Value, Vec<Value>)> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut article = properties::parse_markdown(&content);
    properties::merge_record(&mut article, file_name, records);

    if article.title.is_none() {
        return Err(Error::Extraction(format!("no title found in {file_name}")));
    }

    let page_properties = properties::build_properties(&article, &content, schema, field_map);
    let body_blocks = blocks::markdown_to_blocks(&article.body);
    Ok((page_properties, body_blocks))
}

async fn load_records(json_file: &str) -> Vec<ArticleRecord> {
    match tokio::fs::read_to_string(json_file).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(file = json_file, error = %e, "Run index unreadable; importing from Markdown only");
                Vec::new()
            }
        },
        Err(e) => {
            warn!(file = json_file, error = %e, "Run index missing; importing from Markdown only");
            Vec::new()
        }
    }
}

/// Markdown file names in the directory, sorted so the numeric prefixes
/// keep their original order.
async fn markdown_files(dir: &str) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::Config(format!("cannot read Markdown dir {dir}: {e}")))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".md") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}
