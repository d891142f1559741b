//! Fallback extractor for sites without a dedicated profile.
//!
//! Best-effort heuristics: first `h1` (or the `<title>` tag) for the title,
//! any `time[datetime]` for the date, and the first recognizable content
//! container for the body. When the container has no paragraph markup at
//! all, its entire text is emitted as a single paragraph rather than losing
//! the article.

use super::{Extracted, element_text, first_attr, normalize_date, resolve_image_src};
use crate::models::ContentBlock;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TITLE_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        "main",
        "[role=article]",
        ".article-content",
        ".post-content",
        ".entry-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

pub fn extract(document: &Html, url: &Url) -> Extracted {
    let title = document
        .select(&H1)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(&TITLE_TAG)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
        });

    let date = document
        .select(&TIME)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(normalize_date);

    let mut blocks = Vec::new();
    let container = CONTAINERS
        .iter()
        .find_map(|sel| document.select(sel).next());

    if let Some(container) = container {
        for p in container.select(&PARAGRAPH) {
            let text = element_text(p);
            if !text.is_empty() {
                blocks.push(ContentBlock::Paragraph { text });
            }
        }
        if blocks.is_empty() {
            // No paragraph markup: keep the whole container as one block.
            let text = element_text(container);
            if !text.is_empty() {
                blocks.push(ContentBlock::Paragraph { text });
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        for img in container.select(&IMG) {
            let Some(src) = first_attr(img, &["src", "data-src"]) else { continue };
            let Some(resolved) = resolve_image_src(src, url) else { continue };
            if seen.insert(resolved.clone()) {
                let alt = img
                    .value()
                    .attr("alt")
                    .map(str::to_string)
                    .filter(|a| !a.is_empty());
                blocks.push(ContentBlock::Image { url: resolved, alt });
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
        let url = Url::parse("https://blog.example.com/post/1").unwrap();
        extract(&doc, &url)
    }

    #[test]
    fn test_generic_article_container() {
        let extracted = extract_fixture(
            r#"<h1>Some Post</h1>
            <time datetime="2025-03-04">March 4</time>
            <article>
              <p>First paragraph of the post.</p>
              <p>Second paragraph of the post.</p>
              <img src="/pic.png" alt="pic">
            </article>"#,
        );
        assert_eq!(extracted.title.as_deref(), Some("Some Post"));
        assert_eq!(extracted.date.as_deref(), Some("04.03.2025"));
        assert_eq!(extracted.blocks.len(), 3);
        assert!(matches!(
            &extracted.blocks[2],
            ContentBlock::Image { url, .. } if url == "https://blog.example.com/pic.png"
        ));
    }

    #[test]
    fn test_generic_title_tag_fallback() {
        let extracted = extract_fixture(
            r#"<html><head><title>Page Title</title></head>
            <body><main><p>Body text.</p></main></body></html>"#,
        );
        assert_eq!(extracted.title.as_deref(), Some("Page Title"));
    }

    #[test]
    fn test_generic_whole_container_when_no_paragraphs() {
        let extracted = extract_fixture(
            r#"<div class="post-content">Just a wall of text without markup.</div>"#,
        );
        assert_eq!(
            extracted.blocks,
            vec![ContentBlock::Paragraph {
                text: "Just a wall of text without markup.".into()
            }]
        );
    }

    #[test]
    fn test_generic_container_priority() {
        let extracted = extract_fixture(
            r#"<article><p>From the article tag.</p></article>
            <div class="entry-content"><p>From the entry content.</p></div>"#,
        );
        assert_eq!(extracted.blocks.len(), 1);
        assert!(matches!(
            &extracted.blocks[0],
            ContentBlock::Paragraph { text } if text == "From the article tag."
        ));
    }

    #[test]
    fn test_generic_no_container_yields_no_blocks() {
        let extracted = extract_fixture(r#"<div><p>Unanchored text.</p></div>"#);
        assert!(extracted.blocks.is_empty());
    }
}
