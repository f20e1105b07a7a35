use crate::models::{Image, PageRecord};
use crate::url_normalizer::normalize;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

// Cached selectors to avoid repeated parsing and eliminate unwrap() calls
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector should be valid"));
static META_DESC_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='description']").expect("meta description selector should be valid")
});
static VIEWPORT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='viewport']").expect("viewport selector should be valid")
});
static CANONICAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link[rel='canonical'][href]").expect("canonical selector should be valid")
});
static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:title'], meta[name='og:title']")
        .expect("og:title selector should be valid")
});
static OG_DESC_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:description'], meta[name='og:description']")
        .expect("og:description selector should be valid")
});
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("h1 selector should be valid"));
static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("img selector should be valid"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("a[href] selector should be valid"));

/// Elements whose text never renders
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses `html` and pulls the on-page signals out of it.
///
/// `base` is the URL the body was served from and is used to resolve links.
/// The returned record carries `base` as its URL and status 0; the caller
/// fills in the requested URL, status and depth.
pub fn extract(html: &str, base: &Url) -> PageRecord {
    let document = Html::parse_document(html);

    PageRecord {
        parsed: true,
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        canonical: extract_canonical(&document, base),
        h1_count: document.select(&H1_SELECTOR).count(),
        images: extract_images(&document, base),
        has_open_graph: has_meta_content(&document, &OG_TITLE_SELECTOR)
            && has_meta_content(&document, &OG_DESC_SELECTOR),
        has_viewport: document.select(&VIEWPORT_SELECTOR).next().is_some(),
        html_length: html.len(),
        text_length: visible_text_length(&document),
        outbound_links: extract_links(&document, base),
        ..PageRecord::failed(base.clone(), 0, 0)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .and_then(|el| non_blank(&el.text().collect::<String>()))
}

fn extract_meta_description(document: &Html) -> Option<String> {
    document
        .select(&META_DESC_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .and_then(non_blank)
}

fn extract_canonical(document: &Html, base: &Url) -> Option<Url> {
    document
        .select(&CANONICAL_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| normalize(base, href))
}

fn has_meta_content(document: &Html, selector: &Selector) -> bool {
    document.select(selector).any(|el| {
        el.value()
            .attr("content")
            .is_some_and(|content| !content.trim().is_empty())
    })
}

fn extract_images(document: &Html, base: &Url) -> Vec<Image> {
    document
        .select(&IMG_SELECTOR)
        .map(|element| {
            let raw = element.value().attr("src").unwrap_or("").trim();
            // An empty src must not resolve to the page itself
            let src = if raw.is_empty() {
                String::new()
            } else {
                base.join(raw)
                    .map(|absolute| absolute.to_string())
                    .unwrap_or_else(|_| raw.to_string())
            };
            let has_alt = element
                .value()
                .attr("alt")
                .is_some_and(|alt| !alt.trim().is_empty());

            Image { src, has_alt }
        })
        .collect()
}

fn extract_links(document: &Html, base: &Url) -> Vec<Url> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| normalize(base, href))
        .collect()
}

/// Byte length of the rendered text: trimmed text nodes joined by one space.
fn visible_text_length(document: &Html) -> usize {
    let mut length = 0;
    let mut pieces: usize = 0;

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().filter_map(ElementRef::wrap).any(|el| {
            INVISIBLE_ELEMENTS.contains(&el.value().name())
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            length += trimmed.len();
            pieces += 1;
        }
    }

    length + pieces.saturating_sub(1)
}
