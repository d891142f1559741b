//! Data models for scraped articles.
//!
//! This module defines the core data structures shared by the parse and
//! import stages:
//! - [`SiteType`]: which extraction profile handles a URL
//! - [`ContentBlock`]: one ordered unit of article body content
//! - [`ArticleRecord`]: the normalized result for one input URL
//!
//! An [`ArticleRecord`] is created once per URL and never mutated afterwards;
//! a failed fetch or extraction still produces a record with
//! `status = error` so the run artifact accounts for every input.

use serde::{Deserialize, Serialize};

/// Site profile resolved from a URL's host.
///
/// Classification is the only way a `SiteType` is assigned and it cannot
/// fail: hosts that match no known domain (or URLs that do not parse) fall
/// back to [`SiteType::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteType {
    Vcru,
    Techcrunch,
    Habr,
    Crunchbase,
    Infoq,
    Generic,
}

impl SiteType {
    /// Map a URL to its site profile by inspecting the host.
    ///
    /// Matching is case-insensitive and ignores scheme and subdomains, so
    /// `https://WWW.VC.RU/...` and `https://news.crunchbase.com/...` both
    /// resolve to their profiles.
    pub fn classify(url: &str) -> SiteType {
        let host = match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(h) => h.to_lowercase(),
                None => return SiteType::Generic,
            },
            Err(_) => return SiteType::Generic,
        };

        if host_matches(&host, "vc.ru") {
            SiteType::Vcru
        } else if host_matches(&host, "techcrunch.com") {
            SiteType::Techcrunch
        } else if host_matches(&host, "habr.com") {
            SiteType::Habr
        } else if host_matches(&host, "crunchbase.com") {
            SiteType::Crunchbase
        } else if host_matches(&host, "infoq.com") {
            SiteType::Infoq
        } else {
            SiteType::Generic
        }
    }
}

/// True when `host` is `domain` itself or a subdomain of it.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// One unit of article body content. Order is document order and is
/// preserved from extraction through rendering and upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: String },
    Image { url: String, alt: Option<String> },
    ListItem { text: String },
}

/// An image referenced by an article, with its original alt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    pub url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Success,
    Error,
}

/// The normalized result for one processed URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The source URL, the stable identifier for this run.
    pub url: String,
    /// The profile that extracted (or would have extracted) this article.
    pub site_type: SiteType,
    /// Absent when the profile found no usable title.
    pub title: Option<String>,
    /// Publication date in `DD.MM.YYYY`, absent when none was found.
    pub date: Option<String>,
    /// Ordered body blocks; empty only for error records.
    pub body: Vec<ContentBlock>,
    /// Images referenced by the article. Some profiles deliberately leave
    /// this empty (see the habr extractor).
    pub images: Vec<ArticleImage>,
    pub status: ArticleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ArticleRecord {
    /// Build an error record for a URL that failed to fetch or extract.
    pub fn failed(url: &str, site_type: SiteType, detail: String) -> Self {
        ArticleRecord {
            url: url.to_string(),
            site_type,
            title: None,
            date: None,
            body: Vec::new(),
            images: Vec::new(),
            status: ArticleStatus::Error,
            error_detail: Some(detail),
        }
    }
}
