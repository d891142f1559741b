//! Output artifacts: per-article Markdown files and the JSON run index.

pub mod json;
pub mod markdown;
