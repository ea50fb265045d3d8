use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Scan a landing page for anchors whose visible text looks like a link to a
/// contact or about page. Matching on link text rather than URL path tolerates
/// arbitrary site structures; the pattern carries the target country's own
/// vocabulary because such anchors are labeled in the site's language.
///
/// The originating URL is appended as a final fallback so the landing page
/// itself still gets harvested when nothing matches. Absence of a match is a
/// normal outcome, not an error.
pub fn find_contact_links(
    page_source: &str,
    base: &Url,
    contact_pattern: &Regex,
    skip_pattern: &Regex,
) -> Vec<String> {
    let document = Html::parse_document(page_source);
    let mut seen = HashSet::new();
    let mut candidates = vec![];

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let text: String = anchor.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if text.is_empty() || !contact_pattern.is_match(text) || skip_pattern.is_match(text) {
            continue;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("javascript:")
        {
            continue;
        }

        let Ok(absolute) = base.join(href) else {
            continue;
        };
        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            continue;
        }

        let absolute = absolute.to_string();
        if seen.insert(absolute.clone()) {
            candidates.push(absolute);
        }
    }

    candidates.push(base.to_string());
    candidates
}
