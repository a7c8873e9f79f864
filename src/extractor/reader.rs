use readability::extractor;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::extractor::{
    ContentExtractor,
    model::{ReadableArticle, normalize_whitespace},
};

/// Container selectors tried, in order, when readability gives up.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".content",
    ".post",
    ".article",
    "#content",
    "#main",
    ".entry-content",
];
const MIN_CONTAINER_TEXT: usize = 100;

/// Readability first, then a selector-based fallback over the raw document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityExtractor;

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Option<ReadableArticle> {
        let document = Html::parse_document(html);
        let site_name = extract_site_name(&document);

        if let Ok(article) = extractor::extract(&mut html.as_bytes(), base_url) {
            let text = normalize_whitespace(&article.text);
            if !text.is_empty() {
                let title = match article.title.trim() {
                    "" => title_or_host(&document, base_url),
                    title => title.to_string(),
                };
                return Some(ReadableArticle {
                    title,
                    site_name,
                    text,
                });
            }
        }

        debug!("readability produced no text for {}, using fallback", base_url);
        fallback_extract(&document, base_url, site_name)
    }
}

fn fallback_extract(
    document: &Html,
    base_url: &Url,
    site_name: Option<String>,
) -> Option<ReadableArticle> {
    let text = normalize_whitespace(&extract_main_text(document));
    if text.is_empty() {
        return None;
    }

    let title = title_or_host(document, base_url);

    Some(ReadableArticle {
        title,
        site_name,
        text,
    })
}

fn extract_site_name(document: &Html) -> Option<String> {
    if let Some(content) = meta_content(document, "meta[property='og:site_name']") {
        return Some(content);
    }

    // "Article Title - Site Name" or "Article Title | Site Name"
    let title = first_text(document, "title")?;
    ["-", "|"]
        .iter()
        .find_map(|sep| title.rsplit_once(&format!(" {} ", sep)))
        .map(|(_, site)| site.trim().to_string())
        .filter(|site| !site.is_empty())
}

/// Untitled pages are named after their host.
fn title_or_host(document: &Html, base_url: &Url) -> String {
    extract_title(document)
        .or_else(|| base_url.host_str().map(str::to_string))
        .unwrap_or_default()
}

fn extract_title(document: &Html) -> Option<String> {
    meta_content(document, "meta[property='og:title']")
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
}

fn extract_main_text(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(text) = document
            .select(&selector)
            .map(element_text)
            .find(|text| text.trim().len() > MIN_CONTAINER_TEXT)
        {
            return text;
        }
    }

    // Last resort: the whole body
    Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(element_text))
        .unwrap_or_default()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}
