use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("footer, header, nav, li, a, p, span, h1, h2, h3").unwrap());
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img[alt]").unwrap());
static TEL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[href^="tel:"]"#).unwrap());

/// Assemble one text corpus from a rendered page. Contact data is marked up
/// inconsistently in the wild: visible text, image alt attributes and `tel:`
/// hrefs each catch sites the others miss. Order inside the corpus does not
/// matter, extraction is pattern-based.
pub fn harvest_page(page_source: &str) -> String {
    let document = Html::parse_document(page_source);
    let mut corpus = String::new();

    if let Some(body) = document.select(&BODY_SELECTOR).next() {
        for fragment in body.text() {
            let fragment = fragment.trim();
            if !fragment.is_empty() {
                corpus.push_str(fragment);
                corpus.push(' ');
            }
        }
    }

    for element in document.select(&CONTAINER_SELECTOR) {
        let text: String = element.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if !text.is_empty() {
            corpus.push_str(text);
            corpus.push('\n');
        }
    }

    for image in document.select(&IMG_SELECTOR) {
        if let Some(alt) = image.value().attr("alt") {
            let alt = alt.trim();
            if !alt.is_empty() {
                corpus.push_str(alt);
                corpus.push('\n');
            }
        }
    }

    for anchor in document.select(&TEL_SELECTOR) {
        if let Some(href) = anchor.value().attr("href") {
            corpus.push_str(href);
            corpus.push('\n');
        }
    }

    corpus
}
