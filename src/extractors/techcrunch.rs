//! techcrunch.com article extractor.
//!
//! TechCrunch is a WordPress site: title and date come from the
//! `wp-block-post-*` elements, the featured image sits outside the body and
//! is emitted first, and the body is scanned in document order from
//! `div.entry-content`, skipping `ad-unit` subtrees. Images are lazy-loaded
//! behind several `data-*` attributes and `<picture>` sources.

use super::{
    Extracted, element_text, first_attr, first_srcset_url, has_ancestor_class,
    has_ancestor_tag, normalize_date, resolve_image_src,
};
use crate::models::ContentBlock;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.wp-block-post-title").unwrap());
static DATE_TIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.wp-block-post-date time[datetime]").unwrap());
static FEATURED_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("figure.wp-block-post-featured-image img").unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("div.entry-content").unwrap());
static FIGCAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static SOURCE: Lazy<Selector> = Lazy::new(|| Selector::parse("source").unwrap());

const LAZY_SRC_ATTRS: &[&str] =
    &["src", "data-src", "data-lazy-src", "data-original", "data-lazy-loaded"];
const MIN_PARAGRAPH_CHARS: usize = 10;

pub fn extract(document: &Html, url: &Url) -> Extracted {
    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let date = document
        .select(&DATE_TIME)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(normalize_date);

    let mut blocks = Vec::new();
    let mut seen_images: HashSet<String> = HashSet::new();
    let mut seen_texts: HashSet<String> = HashSet::new();

    // The featured image belongs to the article even though it sits outside
    // the body container.
    if let Some(img) = document.select(&FEATURED_IMG).next() {
        if let Some(src) = featured_src(img) {
            if let Some(resolved) = resolve_image_src(&src, url) {
                if seen_images.insert(resolved.clone()) {
                    blocks.push(ContentBlock::Image { url: resolved, alt: image_alt(img) });
                }
            }
        }
    }

    if let Some(content) = document.select(&CONTENT).next() {
        for node in content.descendants() {
            let Some(el) = ElementRef::wrap(node) else { continue };
            if has_ancestor_class(el, "ad-unit") {
                continue;
            }
            match el.value().name() {
                "p" => {
                    let text = element_text(el);
                    if text.chars().count() > MIN_PARAGRAPH_CHARS
                        && seen_texts.insert(text_key(&text))
                    {
                        blocks.push(ContentBlock::Paragraph { text });
                    }
                }
                "img" => {
                    // Images under <picture> are handled at the picture node
                    // so the <source> srcset can stand in for a missing src.
                    if has_ancestor_tag(el, "picture") {
                        continue;
                    }
                    push_image(el, img_src(el), url, &mut blocks, &mut seen_images);
                }
                "picture" => {
                    if let Some(img) = el.select(&IMG).next() {
                        let src = img_src(img).or_else(|| {
                            el.select(&SOURCE)
                                .next()
                                .and_then(|s| first_attr(s, &["srcset", "src"]))
                                .and_then(first_srcset_url)
                                .map(str::to_string)
                        });
                        push_image(img, src, url, &mut blocks, &mut seen_images);
                    }
                }
                _ => {}
            }
        }
    }

    Extracted { title, date, blocks, images: Vec::new() }
}

fn push_image(
    img: ElementRef,
    src: Option<String>,
    url: &Url,
    blocks: &mut Vec<ContentBlock>,
    seen: &mut HashSet<String>,
) {
    let Some(src) = src else { return };
    let Some(resolved) = resolve_image_src(&src, url) else { return };
    if seen.insert(resolved.clone()) {
        blocks.push(ContentBlock::Image { url: resolved, alt: image_alt(img) });
    }
}

fn img_src(img: ElementRef) -> Option<String> {
    first_attr(img, LAZY_SRC_ATTRS)
        .map(str::to_string)
        .or_else(|| img.value().attr("srcset").and_then(first_srcset_url).map(str::to_string))
}

/// The featured image prefers `src`, then the first srcset candidate that is
/// not a resize variant.
fn featured_src(img: ElementRef) -> Option<String> {
    if let Some(src) = first_attr(img, &["src"]) {
        return Some(src.to_string());
    }
    let srcset = img.value().attr("srcset")?;
    let candidates: Vec<&str> = srcset
        .split(',')
        .filter_map(|part| part.trim().split_whitespace().next())
        .collect();
    candidates
        .iter()
        .find(|u| !u.contains("resize"))
        .or_else(|| candidates.first())
        .map(|u| u.to_string())
}

/// Alt text, preferring the caption of the enclosing figure.
fn image_alt(img: ElementRef) -> Option<String> {
    let caption = img
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| matches!(a.value().name(), "figure" | "div"))
        .and_then(|parent| parent.select(&FIGCAPTION).next())
        .map(element_text)
        .filter(|t| !t.is_empty());
    caption.or_else(|| {
        img.value().attr("alt").map(str::to_string).filter(|a| !a.is_empty())
    })
}

fn text_key(text: &str) -> String {
    text.chars().take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_fixture(html: &str) -> Extracted {
        let doc = Html::parse_document(html);
        let url = Url::parse("https://techcrunch.com/2025/11/10/startup/").unwrap();
        extract(&doc, &url)
    }

    #[test]
    fn test_featured_image_comes_first() {
        let extracted = extract_fixture(
            r#"<h1 class="wp-block-post-title">Startup raises $10M</h1>
            <div class="wp-block-post-date"><time datetime="2025-11-10T08:00:00">Nov 10</time></div>
            <figure class="wp-block-post-featured-image">
              <img src="https://techcrunch.com/wp-content/hero.jpg" alt="hero">
            </figure>
            <div class="entry-content">
              <p>The startup announced a new funding round today.</p>
            </div>"#,
        );
        assert_eq!(extracted.title.as_deref(), Some("Startup raises $10M"));
        assert_eq!(extracted.date.as_deref(), Some("10.11.2025"));
        assert_eq!(extracted.blocks.len(), 2);
        assert!(matches!(&extracted.blocks[0], ContentBlock::Image { .. }));
        assert!(matches!(&extracted.blocks[1], ContentBlock::Paragraph { .. }));
    }

    #[test]
    fn test_featured_srcset_prefers_non_resize_variant() {
        let extracted = extract_fixture(
            r#"<figure class="wp-block-post-featured-image">
              <img srcset="https://cdn/img.jpg?resize=300 300w, https://cdn/img-full.jpg 1200w">
            </figure>
            <div class="entry-content"><p>Body text long enough to count.</p></div>"#,
        );
        assert!(matches!(
            &extracted.blocks[0],
            ContentBlock::Image { url, .. } if url == "https://cdn/img-full.jpg"
        ));
    }

    #[test]
    fn test_skips_ad_units_and_short_paragraphs() {
        let extracted = extract_fixture(
            r#"<div class="entry-content">
              <p>A real paragraph with enough characters.</p>
              <div class="ad-unit"><p>Sponsored content you should not see here.</p></div>
              <p>Ads</p>
            </div>"#,
        );
        assert_eq!(extracted.blocks.len(), 1);
        assert!(matches!(&extracted.blocks[0], ContentBlock::Paragraph { text } if text.starts_with("A real")));
    }

    #[test]
    fn test_lazy_loaded_and_picture_images() {
        let extracted = extract_fixture(
            r#"<div class="entry-content">
              <p>Intro paragraph with sufficient length.</p>
              <img data-lazy-src="https://cdn/lazy.jpg" alt="lazy">
              <picture>
                <source srcset="https://cdn/pic.webp 800w, https://cdn/pic2.webp 1600w">
                <img alt="pic">
              </picture>
            </div>"#,
        );
        let urls: Vec<_> = extracted
            .blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Image { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(urls, vec!["https://cdn/lazy.jpg", "https://cdn/pic.webp"]);
    }

    #[test]
    fn test_duplicate_images_collapse() {
        let extracted = extract_fixture(
            r#"<div class="entry-content">
              <p>Paragraph body long enough to keep around.</p>
              <img src="https://cdn/same.jpg">
              <img src="https://cdn/same.jpg">
            </div>"#,
        );
        let image_count = extracted
            .blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::Image { .. }))
            .count();
        assert_eq!(image_count, 1);
    }

    #[test]
    fn test_figcaption_overrides_alt() {
        let extracted = extract_fixture(
            r#"<div class="entry-content">
              <p>Paragraph body long enough to keep around.</p>
              <figure>
                <img src="https://cdn/cap.jpg" alt="alt text">
                <figcaption>Proper caption</figcaption>
              </figure>
            </div>"#,
        );
        assert!(extracted.blocks.iter().any(|b| matches!(
            b,
            ContentBlock::Image { alt: Some(a), .. } if a == "Proper caption"
        )));
    }
}
