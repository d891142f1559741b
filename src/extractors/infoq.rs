//! www.infoq.com article extractor.
//!
//! InfoQ prints the publication date inside the "read time" line, as bare
//! text nodes preceding a `span.dot` separator. The body lives in
//! `div.article__data` with ad containers interleaved.

use super::{
    Extracted, element_text, first_attr, has_ancestor_class, normalize_date, resolve_image_src,
};
use crate::models::ContentBlock;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.article__title").unwrap());
static ANY_H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static READ_TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("p.article__readTime").unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("div.article__data").unwrap());

const LAZY_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];
const MIN_PARAGRAPH_CHARS: usize = 10;

pub fn extract(document: &Html, url: &Url) -> Extracted {
    let title = document
        .select(&TITLE)
        .next()
        .or_else(|| document.select(&ANY_H1).next())
        .map(element_text)
        .filter(|t| !t.is_empty());

    let date = document.select(&READ_TIME).next().and_then(read_time_date);

    let mut blocks = Vec::new();
    let mut seen_images: HashSet<String> = HashSet::new();
    let mut seen_texts: HashSet<String> = HashSet::new();

    if let Some(content) = document.select(&CONTENT).next() {
        for node in content.descendants() {
            let Some(el) = ElementRef::wrap(node) else { continue };
            if has_ancestor_class(el, "ad") {
                continue;
            }
            match el.value().name() {
                "p" => {
                    // The read-time line also matches `p`; it never reaches
                    // here because it sits outside the article data div.
                    let text = element_text(el);
                    if text.chars().count() <= MIN_PARAGRAPH_CHARS {
                        continue;
                    }
                    let key: String = text.chars().take(100).collect();
                    if seen_texts.insert(key) {
                        blocks.push(ContentBlock::Paragraph { text });
                    }
                }
                "img" => {
                    let Some(src) = first_attr(el, LAZY_SRC_ATTRS) else { continue };
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

/// Date from the read-time line: text nodes before the `span.dot` separator.
fn read_time_date(read_time: ElementRef) -> Option<String> {
    let mut raw = String::new();
    for child in read_time.children() {
        if let Some(el) = ElementRef::wrap(child) {
            if el.value().name() == "span" && el.value().classes().any(|c| c == "dot") {
                break;
            }
        } else if let Some(text) = child.value().as_text() {
            raw.push_str(text);
        }
    }
    let raw = collapse_whitespace(&raw);
    if raw.is_empty() { None } else { normalize_date(&raw) }
}
