//! news.crunchbase.com article extractor.
//!
//! Crunchbase News runs the Herald WordPress theme: body content lives in
//! `div.herald-entry-content` with `herald-ad` inserts and subscription
//! forms mixed in, both of which are skipped during the document-order scan.

use super::{
    Extracted, element_text, first_attr, has_ancestor_class, has_ancestor_tag, normalize_date,
    resolve_image_src,
};
use crate::models::ContentBlock;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.entry-title").unwrap());
static UPDATED: Lazy<Selector> = Lazy::new(|| Selector::parse("span.updated").unwrap());
static CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.herald-entry-content").unwrap());

const MIN_PARAGRAPH_CHARS: usize = 10;

pub fn extract(document: &Html, url: &Url) -> Extracted {
    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    // The Herald theme prints the date as plain text, e.g. "January 22, 2026".
    let date = document
        .select(&UPDATED)
        .next()
        .map(element_text)
        .as_deref()
        .and_then(normalize_date);

    let mut blocks = Vec::new();
    let mut seen_images: HashSet<String> = HashSet::new();

    if let Some(content) = document.select(&CONTENT).next() {
        for node in content.descendants() {
            let Some(el) = ElementRef::wrap(node) else { continue };
            if has_ancestor_class(el, "herald-ad") || has_ancestor_tag(el, "form") {
                continue;
            }
            match el.value().name() {
                "p" => {
                    let text = element_text(el);
                    if text.chars().count() <= MIN_PARAGRAPH_CHARS {
                        continue;
                    }
                    if matches!(blocks.last(), Some(ContentBlock::Paragraph { text: prev }) if *prev == text)
                    {
                        continue;
                    }
                    blocks.push(ContentBlock::Paragraph { text });
                }
                "img" => {
                    let Some(src) = first_attr(el, &["src", "data-src"]) else { continue };
                    let Some(resolved) = resolve_image_src(src, url) else { continue };
                    if seen_images.insert(resolved.clone()) {
                        let alt = el
                            .value()
                            .attr("alt")
                            .map(str::to_string)
                            .filter(|a| !a.is_empty());
                        blocks.push(ContentBlock::Image { url: resolved, alt });
                    }
                }
                _ => {}
            }
        }
    }

    Extracted { title, date, blocks, images: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_fixture(html: &str) -> Extracted {
        let doc = Html::parse_document(html);
        let url = Url::parse("https://news.crunchbase.com/venture/round/").unwrap();
        extract(&doc, &url)
    }

    #[test]
    fn test_crunchbase_title_date_and_body() {
        let extracted = extract_fixture(
            r#"<h1 class="entry-title">Venture Funding Hits New High</h1>
            <span class="updated">January 22, 2026</span>
            <div class="herald-entry-content">
              <p>Funding rose sharply across every stage this quarter.</p>
              <img src="/charts/q1.png" alt="chart">
            </div>"#,
        );
        assert_eq!(extracted.title.as_deref(), Some("Venture Funding Hits New High"));
        assert_eq!(extracted.date.as_deref(), Some("22.01.2026"));
        assert_eq!(extracted.blocks.len(), 2);
        assert!(matches!(
            &extracted.blocks[1],
            ContentBlock::Image { url, .. } if url == "https://news.crunchbase.com/charts/q1.png"
        ));
    }

    #[test]
    fn test_crunchbase_skips_ads_and_forms() {
        let extracted = extract_fixture(
            r#"<div class="herald-entry-content">
              <p>Real reporting with enough characters to keep.</p>
              <div class="herald-ad"><p>Buy our premium data subscription today!</p></div>
              <form><p>Subscribe to the newsletter for weekly updates.</p></form>
            </div>"#,
        );
        assert_eq!(extracted.blocks.len(), 1);
    }
}
