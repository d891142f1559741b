//! Page property mapping for the import stage.
//!
//! The Markdown files are the import source of truth for the body, but the
//! header metadata is re-parsed and then merged with the richer record from
//! `parsed_articles.json` (matched by the numeric file prefix, else by URL).
//! Multi-valued fields come from a YAML mapping file instead of being wired
//! in: each entry pairs a `**Label:**` line in the Markdown with a
//! multi_select property in the destination database.

use crate::error::{Error, Result};
use crate::models::ArticleRecord;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tracing::warn;

static TITLE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
static DATE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Дата публикации:\*\*\s+(\d{2}\.\d{2}\.\d{4})").unwrap());
static SOURCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Источник:\*\*\s+(https?://\S+)").unwrap());
static FILE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{3})_").unwrap());

/// Metadata and body re-parsed from one rendered Markdown file.
#[derive(Debug, Default, PartialEq)]
pub struct MarkdownArticle {
    pub title: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub body: String,
}

/// One entry of the `--field-map` YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapEntry {
    /// Label of a `**Label:** v1, v2` line in the Markdown header.
    pub label: String,
    /// Destination multi_select property in the database.
    pub property: String,
}

/// Load the multi-valued field mapping from a YAML file.
pub async fn load_field_map(path: &str) -> Result<Vec<FieldMapEntry>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config(format!("cannot read field map {path}: {e}")))?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Re-parse a rendered Markdown file into its header metadata and body.
pub fn parse_markdown(content: &str) -> MarkdownArticle {
    let capture = |re: &Regex| {
        re.captures(content)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let body = content
        .split_once("\n---\n")
        .map(|(_, rest)| rest.trim_start().to_string())
        .unwrap_or_default();

    MarkdownArticle {
        title: capture(&TITLE_LINE),
        date: capture(&DATE_LINE),
        url: capture(&SOURCE_LINE),
        body,
    }
}

/// Merge the matching JSON record into a re-parsed article.
///
/// The record is located by the 3-digit file prefix (its 1-based position in
/// the record array), falling back to a URL match. Record fields win over
/// the re-parsed header where present.
pub fn merge_record<'a>(
    article: &mut MarkdownArticle,
    file_name: &str,
    records: &'a [ArticleRecord],
) -> Option<&'a ArticleRecord> {
    let by_prefix = FILE_PREFIX
        .captures(file_name)
        .and_then(|c| c[1].parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| records.get(i));
    let record = by_prefix
        .or_else(|| records.iter().find(|r| Some(&r.url) == article.url.as_ref()))?;

    if record.title.is_some() {
        article.title = record.title.clone();
    }
    if record.date.is_some() {
        article.date = record.date.clone();
    }
    article.url = Some(record.url.clone());
    Some(record)
}

/// Build the Notion page property set for one article.
///
/// `schema` maps database property names to their types. Standard fields are
/// only set when the destination property exists with the expected type;
/// multi-valued fields additionally need a `**Label:**` line in the
/// Markdown. Mismatches are warned about and skipped, never fatal.
pub fn build_properties(
    article: &MarkdownArticle,
    content: &str,
    schema: &HashMap<String, String>,
    field_map: &[FieldMapEntry],
) -> Value {
    let mut properties = Map::new();

    if let Some(title) = &article.title {
        properties.insert(
            "Name".to_string(),
            json!({ "title": [{ "text": { "content": title } }] }),
        );
    }

    if let Some(url) = &article.url {
        if schema.get("URL").map(String::as_str) == Some("url") {
            properties.insert("URL".to_string(), json!({ "url": url }));
        } else {
            warn!(property = "URL", "Database has no url property; skipping");
        }
    }

    if let Some(date) = article.date.as_deref().and_then(to_iso_date) {
        if schema.get("Дата публикации").map(String::as_str) == Some("date") {
            properties.insert(
                "Дата публикации".to_string(),
                json!({ "date": { "start": date } }),
            );
        } else {
            warn!(property = "Дата публикации", "Database has no date property; skipping");
        }
    }

    for entry in field_map {
        let Some(values) = labeled_values(content, &entry.label) else { continue };
        if schema.get(&entry.property).map(String::as_str) != Some("multi_select") {
            warn!(
                label = %entry.label,
                property = %entry.property,
                "Destination is not a multi_select property; skipping field"
            );
            continue;
        }
        let options: Vec<Value> = values.iter().map(|v| json!({ "name": v })).collect();
        properties.insert(entry.property.clone(), json!({ "multi_select": options }));
    }

    Value::Object(properties)
}

/// `DD.MM.YYYY` → `YYYY-MM-DD`.
fn to_iso_date(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date, "%d.%m.%Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Comma-separated values of a `**Label:** v1, v2` header line.
fn labeled_values(content: &str, label: &str) -> Option<Vec<String>> {
    let re = Regex::new(&format!(r"(?m)^\*\*{}:\*\*\s*(.+)$", regex::escape(label))).ok()?;
    let raw = re.captures(content)?[1].to_string();
    let values: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() { None } else { Some(values) }
}
