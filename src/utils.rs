//! Utility functions for string cleanup, file naming, and URL list parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());
static URL_IN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap());

/// Collapse runs of whitespace (including newlines) into single spaces.
///
/// Extracted paragraph text is often split across inline elements, which
/// leaves stray newlines and doubled spaces behind.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Create a safe file name from a title or URL path.
///
/// Removes characters that are invalid in file names, replaces spaces with
/// underscores, collapses runs of underscores, and truncates to `max_length`
/// characters.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    let cleaned = UNDERSCORES.replace_all(&cleaned, "_");
    cleaned.chars().take(max_length).collect::<String>().trim_matches('_').to_string()
}

/// Extract every URL from a line of text, ignoring surrounding prose.
///
/// URL list files often carry the article title and the link on the same
/// line; only the `http(s)://` parts are kept.
pub fn extract_urls_from_line(line: &str) -> Vec<String> {
    URL_IN_LINE.find_iter(line).map(|m| m.as_str().to_string()).collect()
}

/// Truncate a string for logging purposes, appending the elided byte count.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}…(+{} bytes)", cut, s.len() - cut.len())
    }
}
