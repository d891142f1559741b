//! Markdown body → Notion block objects.
//!
//! The Notion API caps children at 100 blocks per request, both on page
//! creation and on append, so long articles are split into an initial
//! create batch plus follow-up append batches.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

/// Notion rejects requests with more than 100 children.
pub const BLOCK_CEILING: usize = 100;

/// Notion caps a single rich_text content string at 2000 characters.
const MAX_TEXT_CHARS: usize = 2000;

static IMAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[(?P<alt>[^\]]*)\]\((?P<url>[^)\s]+)\)$").unwrap());

/// Convert a Markdown body into Notion block objects, in order.
///
/// Consecutive non-blank text lines merge into one paragraph; `- ` lines
/// become bulleted list items; `![alt](url)` lines become external images.
pub fn markdown_to_blocks(body: &str) -> Vec<Value> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    let flush = |paragraph: &mut Vec<&str>, blocks: &mut Vec<Value>| {
        if !paragraph.is_empty() {
            let text = paragraph.join(" ");
            blocks.push(text_block("paragraph", &text));
            paragraph.clear();
        }
    };

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut paragraph, &mut blocks);
        } else if let Some(caps) = IMAGE_LINE.captures(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(json!({
                "object": "block",
                "type": "image",
                "image": {
                    "type": "external",
                    "external": { "url": &caps["url"] },
                },
            }));
        } else if let Some(item) = line.strip_prefix("- ") {
            flush(&mut paragraph, &mut blocks);
            blocks.push(text_block("bulleted_list_item", item));
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut paragraph, &mut blocks);

    blocks
}

/// Split blocks into the create-page batch and follow-up append batches.
///
/// Order is preserved across batches; every batch stays at or under
/// [`BLOCK_CEILING`].
pub fn split_for_upload(blocks: Vec<Value>) -> (Vec<Value>, Vec<Vec<Value>>) {
    let mut chunks = blocks.chunks(BLOCK_CEILING).map(<[Value]>::to_vec);
    let initial = chunks.next().unwrap_or_default();
    (initial, chunks.collect())
}

fn text_block(kind: &str, text: &str) -> Value {
    let content: String = text.chars().take(MAX_TEXT_CHARS).collect();
    json!({
        "object": "block",
        "type": kind,
        kind: {
            "rich_text": [{ "type": "text", "text": { "content": content } }],
        },
    })
}
