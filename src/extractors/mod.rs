//! Site-specific field extractors.
//!
//! Each submodule implements the extraction rules for one site profile.
//! All profiles share the same contract: given a parsed document and its
//! URL, produce a title, a publication date normalized to `DD.MM.YYYY`,
//! and an ordered sequence of body blocks.
//!
//! # Supported profiles
//!
//! | Profile | Module | Notes |
//! |---------|--------|-------|
//! | vc.ru | [`vcru`] | block-wrapper figures: text, lists, media |
//! | TechCrunch | [`techcrunch`] | WordPress layout, featured image first |
//! | Habr | [`habr`] | images deliberately not extracted |
//! | Crunchbase News | [`crunchbase`] | herald theme, ad/form subtrees skipped |
//! | InfoQ | [`infoq`] | read-time line carries the date |
//! | anything else | [`generic`] | heuristic container and `<p>` scan |
//!
//! Title and date extraction degrade to `None` on failure; an empty body is
//! terminal for the article ([`Error::Extraction`]).

use crate::error::{Error, Result};
use crate::models::{ArticleImage, ContentBlock, SiteType};
use crate::utils::collapse_whitespace;
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use url::Url;

pub mod crunchbase;
pub mod generic;
pub mod habr;
pub mod infoq;
pub mod techcrunch;
pub mod vcru;

/// Normalized output of one extraction profile.
#[derive(Debug, Default)]
pub struct Extracted {
    pub title: Option<String>,
    pub date: Option<String>,
    pub blocks: Vec<ContentBlock>,
    pub images: Vec<ArticleImage>,
}

/// Run the extraction profile selected by the classifier.
///
/// The image list is derived from the image blocks in document order,
/// deduplicated by URL. An empty body is an error: an article with no body
/// has no value.
pub fn extract(site: SiteType, html: &str, url: &Url) -> Result<Extracted> {
    let document = Html::parse_document(html);
    let mut extracted = match site {
        SiteType::Vcru => vcru::extract(&document, url),
        SiteType::Techcrunch => techcrunch::extract(&document, url),
        SiteType::Habr => habr::extract(&document, url),
        SiteType::Crunchbase => crunchbase::extract(&document, url),
        SiteType::Infoq => infoq::extract(&document, url),
        SiteType::Generic => generic::extract(&document, url),
    };

    if extracted.blocks.is_empty() {
        return Err(Error::Extraction(format!("no body content found at {url}")));
    }
    extracted.images = images_from_blocks(&extracted.blocks);
    Ok(extracted)
}

/// Collect the unique images referenced by a block sequence, in order.
pub fn images_from_blocks(blocks: &[ContentBlock]) -> Vec<ArticleImage> {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Image { url, alt } => {
                Some(ArticleImage { url: url.clone(), alt: alt.clone() })
            }
            _ => None,
        })
        .unique_by(|img| img.url.clone())
        .collect()
}

/// Normalize a raw date string to `DD.MM.YYYY`.
///
/// Handles ISO datetimes with optional fractional seconds and `Z`/offset
/// suffixes, bare `YYYY-MM-DD`, and spelled-out English dates such as
/// `January 22, 2026`. The first format that parses wins; anything else
/// yields `None` (a missing date is not an error).
pub fn normalize_date(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim().to_string();
    if let Some(stripped) = cleaned.strip_suffix('Z') {
        cleaned = stripped.to_string();
    }
    // Strip a trailing timezone offset (+03:00 or -08:00).
    if let Some(pos) = cleaned.find('+') {
        cleaned.truncate(pos);
    } else if cleaned.matches('-').count() > 2 {
        if let Some(idx) = cleaned.rfind('-') {
            if cleaned[idx + 1..].contains(':') {
                cleaned.truncate(idx);
            }
        }
    }
    let cleaned = cleaned.trim();

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.format("%d.%m.%Y").to_string());
        }
    }
    for fmt in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%b %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(date.format("%d.%m.%Y").to_string());
        }
    }
    None
}

/// Text of an element with inline markup flattened and whitespace collapsed.
pub(crate) fn element_text(el: ElementRef) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Resolve an image `src` against the page URL.
///
/// Protocol-relative `//...` sources get `https:`, relative paths are joined
/// against the page URL, and inline `data:` URIs are dropped.
pub(crate) fn resolve_image_src(src: &str, page_url: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if src.starts_with("http") {
        return Some(src.to_string());
    }
    page_url.join(src).ok().map(|u| u.to_string())
}

/// First present attribute among `attrs`, e.g. `src` then lazy-load
/// fallbacks.
pub(crate) fn first_attr<'a>(el: ElementRef<'a>, attrs: &[&str]) -> Option<&'a str> {
    attrs.iter().find_map(|name| el.value().attr(name)).filter(|v| !v.trim().is_empty())
}

/// First URL of a `srcset` attribute value.
pub(crate) fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset.split(',').next()?.trim().split_whitespace().next()
}

/// True when any ancestor element carries a class containing `needle`
/// (case-insensitive). Used to skip ad subtrees during document-order scans.
pub(crate) fn has_ancestor_class(el: ElementRef, needle: &str) -> bool {
    el.ancestors().filter_map(ElementRef::wrap).any(|a| {
        a.value()
            .attr("class")
            .map(|c| c.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// True when any ancestor element has the given tag name.
pub(crate) fn has_ancestor_tag(el: ElementRef, tag: &str) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_iso_with_fraction() {
        assert_eq!(normalize_date("2025-11-10T19:24:46.000"), Some("10.11.2025".into()));
    }

    #[test]
    fn test_normalize_date_iso_with_zone() {
        assert_eq!(normalize_date("2025-11-10T19:24:46Z"), Some("10.11.2025".into()));
        assert_eq!(normalize_date("2025-11-10T19:24:46+03:00"), Some("10.11.2025".into()));
        assert_eq!(normalize_date("2025-11-10T19:24:46-08:00"), Some("10.11.2025".into()));
    }

    #[test]
    fn test_normalize_date_plain_and_english() {
        assert_eq!(normalize_date("2025-11-10"), Some("10.11.2025".into()));
        assert_eq!(normalize_date("January 22, 2026"), Some("22.01.2026".into()));
        assert_eq!(normalize_date("Jan 22, 2026"), Some("22.01.2026".into()));
        assert_eq!(normalize_date("January 22 2026"), Some("22.01.2026".into()));
        assert_eq!(normalize_date(" Jan 22 2026 "), Some("22.01.2026".into()));
    }

    #[test]
    fn test_normalize_date_rejects_garbage() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date("13/01/2025"), None);
    }

    #[test]
    fn test_resolve_image_src() {
        let page = Url::parse("https://vc.ru/media/999").unwrap();
        assert_eq!(
            resolve_image_src("//cdn.vc.ru/img.png", &page),
            Some("https://cdn.vc.ru/img.png".into())
        );
        assert_eq!(
            resolve_image_src("/static/img.png", &page),
            Some("https://vc.ru/static/img.png".into())
        );
        assert_eq!(
            resolve_image_src("https://other.com/a.jpg", &page),
            Some("https://other.com/a.jpg".into())
        );
        assert_eq!(resolve_image_src("data:image/png;base64,AAAA", &page), None);
        assert_eq!(resolve_image_src("  ", &page), None);
    }

    #[test]
    fn test_first_srcset_url() {
        assert_eq!(
            first_srcset_url("https://a/1.jpg 300w, https://a/2.jpg 600w"),
            Some("https://a/1.jpg")
        );
        assert_eq!(first_srcset_url("https://a/only.jpg"), Some("https://a/only.jpg"));
    }

    #[test]
    fn test_images_from_blocks_dedupes_in_order() {
        let blocks = vec![
            ContentBlock::Paragraph { text: "a".into() },
            ContentBlock::Image { url: "https://i/1.png".into(), alt: None },
            ContentBlock::Image { url: "https://i/2.png".into(), alt: Some("x".into()) },
            ContentBlock::Image { url: "https://i/1.png".into(), alt: Some("dup".into()) },
        ];
        let images = images_from_blocks(&blocks);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "https://i/1.png");
        assert_eq!(images[1].url, "https://i/2.png");
    }

    #[test]
    fn test_extract_empty_body_is_terminal() {
        let url = Url::parse("https://example.com/empty").unwrap();
        let err = extract(SiteType::Generic, "<html><body></body></html>", &url).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
