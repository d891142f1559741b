//! Markdown rendering for parsed articles.
//!
//! Rendering is pure: the same record always produces byte-identical
//! output, so re-running the parser over the same inputs leaves the
//! Markdown directory unchanged.

use crate::models::{ArticleRecord, ContentBlock};
use crate::utils::sanitize_filename;

const MAX_SLUG_CHARS: usize = 100;

/// Render one article record as a Markdown document.
///
/// Header: title, publication date (omitted when unknown), source URL,
/// then a rule. The body follows in document order.
pub fn render(record: &ArticleRecord) -> String {
    let mut out = String::new();

    let title = record.title.as_deref().unwrap_or(record.url.as_str());
    out.push_str(&format!("# {title}\n\n"));
    if let Some(date) = &record.date {
        out.push_str(&format!("**Дата публикации:** {date}\n"));
    }
    out.push_str(&format!("**Источник:** {}\n\n---\n\n", record.url));

    let mut in_list = false;
    for block in &record.body {
        match block {
            ContentBlock::ListItem { text } => {
                out.push_str(&format!("- {text}\n"));
                in_list = true;
            }
            other => {
                if in_list {
                    out.push('\n');
                    in_list = false;
                }
                match other {
                    ContentBlock::Paragraph { text } => {
                        out.push_str(&format!("{text}\n\n"));
                    }
                    ContentBlock::Image { url, alt } => {
                        let alt = alt.as_deref().unwrap_or("");
                        out.push_str(&format!("![{alt}]({url})\n\n"));
                    }
                    ContentBlock::ListItem { .. } => unreachable!(),
                }
            }
        }
    }
    if in_list {
        out.push('\n');
    }

    out
}

/// File name for a record: 3-digit 1-based sequence plus a slug from the
/// title, falling back to the URL path.
pub fn file_name(sequence: usize, record: &ArticleRecord) -> String {
    let stem = record
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| slug_from_url(&record.url));
    format!("{:03}_{}.md", sequence, sanitize_filename(&stem, MAX_SLUG_CHARS))
}

fn slug_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .map(str::to_string)
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "article".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteType;

    fn record() -> ArticleRecord {
        ArticleRecord {
            url: "https://vc.ru/media/999".into(),
            site_type: SiteType::Vcru,
            title: Some("Стартап привлёк раунд".into()),
            date: Some("10.11.2025".into()),
            body: vec![
                ContentBlock::Paragraph { text: "Первый абзац.".into() },
                ContentBlock::ListItem { text: "Один".into() },
                ContentBlock::ListItem { text: "Два".into() },
                ContentBlock::Image {
                    url: "https://leonardo.osnova.io/pic.png".into(),
                    alt: Some("Команда".into()),
                },
            ],
            images: Vec::new(),
            status: crate::models::ArticleStatus::Success,
            error_detail: None,
        }
    }

    #[test]
    fn test_render_full_document() {
        let md = render(&record());
        assert_eq!(
            md,
            "# Стартап привлёк раунд\n\n\
             **Дата публикации:** 10.11.2025\n\
             **Источник:** https://vc.ru/media/999\n\n\
             ---\n\n\
             Первый абзац.\n\n\
             - Один\n\
             - Два\n\n\
             ![Команда](https://leonardo.osnova.io/pic.png)\n\n"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = record();
        assert_eq!(render(&r), render(&r));
    }

    #[test]
    fn test_render_omits_missing_date_line() {
        let mut r = record();
        r.date = None;
        let md = render(&r);
        assert!(!md.contains("Дата публикации"));
        assert!(md.contains("**Источник:** https://vc.ru/media/999\n"));
    }

    #[test]
    fn test_render_trailing_list_gets_blank_line() {
        let mut r = record();
        r.body = vec![ContentBlock::ListItem { text: "Последний".into() }];
        assert!(render(&r).ends_with("- Последний\n\n"));
    }

    #[test]
    fn test_file_name_from_title() {
        assert_eq!(file_name(1, &record()), "001_Стартап_привлёк_раунд.md");
    }

    #[test]
    fn test_file_name_falls_back_to_url_path() {
        let mut r = record();
        r.title = None;
        assert_eq!(file_name(12, &r), "012_999.md");
    }

    #[test]
    fn test_file_name_last_resort() {
        let mut r = record();
        r.title = None;
        r.url = "https://example.com/".into();
        assert_eq!(file_name(3, &r), "003_article.md");
    }
}
