//! habr.com article extractor.
//!
//! Habr aggregates IT news and frequently inlines images as base64 data
//! URIs. Embedding those in the rendered Markdown would bloat it out of all
//! proportion to the text, so this profile skips image extraction entirely
//! and always reports an empty image list.

use super::{Extracted, element_text, normalize_date};
use crate::models::ContentBlock;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.tm-title").unwrap());
static TITLE_SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static DATE_TIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.tm-article-datetime-published time[datetime]").unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("div#post-content-body").unwrap());

const MIN_PARAGRAPH_CHARS: usize = 5;

pub fn extract(document: &Html, _url: &Url) -> Extracted {
    let title = document
        .select(&TITLE)
        .next()
        .map(|h1| {
            h1.select(&TITLE_SPAN)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| element_text(h1))
        })
        .filter(|t| !t.is_empty());

    let date = document
        .select(&DATE_TIME)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(normalize_date);

    let mut blocks: Vec<ContentBlock> = Vec::new();
    if let Some(content) = document.select(&CONTENT).next() {
        for node in content.descendants() {
            let Some(el) = ElementRef::wrap(node) else { continue };
            if el.value().name() != "p" {
                continue;
            }
            let text = element_text(el);
            if text.chars().count() <= MIN_PARAGRAPH_CHARS {
                continue;
            }
            // Nested markup can surface the same paragraph twice in a row.
            if matches!(blocks.last(), Some(ContentBlock::Paragraph { text: prev }) if *prev == text)
            {
                continue;
            }
            blocks.push(ContentBlock::Paragraph { text });
        }
    }

    Extracted { title, date, blocks, images: Vec::new() }
}
