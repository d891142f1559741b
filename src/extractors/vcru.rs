//! vc.ru article extractor.
//!
//! vc.ru renders article bodies as a flat list of `figure.block-wrapper`
//! elements inside `article.content__blocks`; each wrapper holds a text
//! block, a list, or a media block. Walking the wrappers in order preserves
//! the document order of paragraphs, list items, and images.

use super::{Extracted, element_text, first_attr, normalize_date, resolve_image_src};
use crate::models::ContentBlock;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1[class*=content-title]").unwrap());
static PUBLISHED: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static WRAPPER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.content__blocks figure.block-wrapper").unwrap());
static TEXT_P: Lazy<Selector> = Lazy::new(|| Selector::parse("div.block-text p").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("ul.block-list li").unwrap());
static MEDIA: Lazy<Selector> = Lazy::new(|| Selector::parse("div.block-media").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static MEDIA_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.media-title").unwrap());

pub fn extract(document: &Html, url: &Url) -> Extracted {
    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let date = document
        .select(&PUBLISHED)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(normalize_date);

    let mut blocks = Vec::new();
    for wrapper in document.select(&WRAPPER) {
        for p in wrapper.select(&TEXT_P) {
            let text = element_text(p);
            if !text.is_empty() {
                blocks.push(ContentBlock::Paragraph { text });
            }
        }
        for li in wrapper.select(&LIST_ITEM) {
            let text = element_text(li);
            if !text.is_empty() {
                blocks.push(ContentBlock::ListItem { text });
            }
        }
        for media in wrapper.select(&MEDIA) {
            // A media block may carry its caption separately from the img alt.
            let caption = media
                .select(&MEDIA_TITLE)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty());
            for img in media.select(&IMG) {
                let Some(src) = first_attr(img, &["src", "data-src"]) else { continue };
                let Some(resolved) = resolve_image_src(src, url) else { continue };
                let alt = caption
                    .clone()
                    .or_else(|| img.value().attr("alt").map(str::to_string))
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
    use crate::extractors;
    use crate::models::{ArticleImage, SiteType};

    const FIXTURE: &str = r#"<html><body>
        <h1 class="content-title">Стартап <span>привлёк раунд</span></h1>
        <time datetime="2025-11-10T19:24:46.000Z">10 ноя</time>
        <article class="content__blocks">
          <figure class="block-wrapper">
            <div class="block-text"><p>Первый абзац о стартапе.</p></div>
          </figure>
          <figure class="block-wrapper">
            <div class="block-text"><p>Второй абзац с деталями.</p></div>
          </figure>
          <figure class="block-wrapper">
            <div class="block-media">
              <img src="//leonardo.osnova.io/pic.png" alt="фото">
              <div class="media-title">Команда стартапа</div>
            </div>
          </figure>
        </article>
    </body></html>"#;

    #[test]
    fn test_vcru_fixture_end_to_end() {
        let url = Url::parse("https://vc.ru/media/999?from=rss").unwrap();
        assert_eq!(SiteType::classify(url.as_str()), SiteType::Vcru);

        let extracted = extractors::extract(SiteType::Vcru, FIXTURE, &url).unwrap();
        assert_eq!(extracted.title.as_deref(), Some("Стартап привлёк раунд"));
        assert_eq!(extracted.date.as_deref(), Some("10.11.2025"));
        assert_eq!(extracted.blocks.len(), 3);
        assert!(matches!(&extracted.blocks[0], ContentBlock::Paragraph { text } if text.contains("Первый")));
        assert!(matches!(&extracted.blocks[1], ContentBlock::Paragraph { text } if text.contains("Второй")));
        assert_eq!(
            extracted.blocks[2],
            ContentBlock::Image {
                url: "https://leonardo.osnova.io/pic.png".into(),
                alt: Some("Команда стартапа".into()),
            }
        );
        assert_eq!(
            extracted.images,
            vec![ArticleImage {
                url: "https://leonardo.osnova.io/pic.png".into(),
                alt: Some("Команда стартапа".into()),
            }]
        );
    }

    #[test]
    fn test_vcru_list_blocks_preserve_order() {
        let html = r#"<article class="content__blocks">
            <figure class="block-wrapper">
              <div class="block-text"><p>Интро.</p></div>
            </figure>
            <figure class="block-wrapper">
              <ul class="block-list"><li>Один</li><li>Два</li></ul>
            </figure>
        </article>"#;
        let doc = Html::parse_document(html);
        let url = Url::parse("https://vc.ru/media/1").unwrap();
        let extracted = extract(&doc, &url);
        assert_eq!(
            extracted.blocks,
            vec![
                ContentBlock::Paragraph { text: "Интро.".into() },
                ContentBlock::ListItem { text: "Один".into() },
                ContentBlock::ListItem { text: "Два".into() },
            ]
        );
    }

    #[test]
    fn test_vcru_skips_base64_images() {
        let html = r#"<article class="content__blocks">
            <figure class="block-wrapper">
              <div class="block-text"><p>Текст.</p></div>
              <div class="block-media"><img src="data:image/png;base64,AAAA"></div>
            </figure>
        </article>"#;
        let doc = Html::parse_document(html);
        let url = Url::parse("https://vc.ru/media/1").unwrap();
        let extracted = extract(&doc, &url);
        assert_eq!(extracted.blocks.len(), 1);
    }

    #[test]
    fn test_vcru_missing_title_and_date_degrade_to_none() {
        let html = r#"<article class="content__blocks">
            <figure class="block-wrapper"><div class="block-text"><p>Тело.</p></div></figure>
        </article>"#;
        let doc = Html::parse_document(html);
        let url = Url::parse("https://vc.ru/media/1").unwrap();
        let extracted = extract(&doc, &url);
        assert_eq!(extracted.title, None);
        assert_eq!(extracted.date, None);
        assert_eq!(extracted.blocks.len(), 1);
    }
}
