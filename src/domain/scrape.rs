use serde::{Deserialize, Serialize};

/// Marker emitted in place of a URL that never reached the browser.
pub const INVALID_URL_MARKER: &str = "Invalid URL";

/// Fallback business name when the search stage supplied no title.
pub const UNKNOWN_NAME: &str = "N/A";

/// Upper bound on emails and phones per result, keeps responses small.
pub const MAX_MATCHES: usize = 4;

/// One candidate business produced by the search stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: String,
}

impl SearchHit {
    pub fn display_name(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some("") | None => UNKNOWN_NAME.to_string(),
            Some(title) => title.to_string(),
        }
    }

    /// A hit only reaches the browser with an absolute http(s) URL.
    pub fn has_scrapable_url(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

/// One entry of the scrape response, same order as the input hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeResult {
    pub name: String,
    pub url: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl ScrapeResult {
    pub fn invalid_url(name: String) -> Self {
        ScrapeResult {
            name,
            url: INVALID_URL_MARKER.to_string(),
            emails: vec![],
            phones: vec![],
        }
    }
}

/// Emails and phones accumulated for one hit across its visited pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContacts {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl ExtractedContacts {
    /// Union with contacts found on another page of the same site. First-seen
    /// order wins and the per-result caps still hold; phones compare by their
    /// digit-only form so formatting differences never duplicate.
    pub fn merge(&mut self, other: ExtractedContacts) {
        for email in other.emails {
            if self.emails.len() >= MAX_MATCHES {
                break;
            }
            if !self.emails.contains(&email) {
                self.emails.push(email);
            }
        }
        for phone in other.phones {
            if self.phones.len() >= MAX_MATCHES {
                break;
            }
            let digits = digits_only(&phone);
            if !self.phones.iter().any(|known| digits_only(known) == digits) {
                self.phones.push(phone);
            }
        }
    }

    /// Early-exit condition for visiting further contact pages.
    pub fn is_full(&self) -> bool {
        self.phones.len() >= MAX_MATCHES
    }
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// What happened while scraping a single hit. A navigation fault downgrades
/// the outcome to `Partial`, carrying whatever was harvested before the
/// failure; it never escapes to sibling hits.
#[derive(Debug)]
pub enum HitOutcome {
    Success(ExtractedContacts),
    Partial(ExtractedContacts, String),
}

impl HitOutcome {
    pub fn into_result(self, name: String, url: String) -> ScrapeResult {
        let contacts = match self {
            HitOutcome::Success(contacts) => contacts,
            HitOutcome::Partial(contacts, reason) => {
                log::error!("Partial result for {}: {}", url, reason);
                contacts
            }
        };
        ScrapeResult {
            name,
            url,
            emails: contacts.emails,
            phones: contacts.phones,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_defaults_to_sentinel() {
        let untitled = SearchHit {
            title: None,
            url: "https://acme.example".to_string(),
        };
        let blank = SearchHit {
            title: Some("   ".to_string()),
            url: "https://acme.example".to_string(),
        };
        let titled = SearchHit {
            title: Some("Acme Corp".to_string()),
            url: "https://acme.example".to_string(),
        };

        assert_eq!(untitled.display_name(), "N/A");
        assert_eq!(blank.display_name(), "N/A");
        assert_eq!(titled.display_name(), "Acme Corp");
    }

    #[test]
    fn only_http_schemes_are_scrapable() {
        let valid = |url: &str| SearchHit {
            title: None,
            url: url.to_string(),
        };

        assert!(valid("https://acme.com").has_scrapable_url());
        assert!(valid("http://acme.com").has_scrapable_url());
        assert!(!valid("").has_scrapable_url());
        assert!(!valid("not-a-url").has_scrapable_url());
        assert!(!valid("ftp://acme.com").has_scrapable_url());
    }

    #[test]
    fn invalid_url_result_is_an_empty_placeholder() {
        let result = ScrapeResult::invalid_url("X".to_string());

        assert_eq!(result.name, "X");
        assert_eq!(result.url, "Invalid URL");
        assert!(result.emails.is_empty());
        assert!(result.phones.is_empty());
    }

    #[test]
    fn partial_outcome_keeps_accumulated_contacts() {
        let mut contacts = ExtractedContacts::default();
        contacts.emails.push("sales@acme.com".to_string());

        let result = HitOutcome::Partial(contacts, "timeout".to_string())
            .into_result("Acme".to_string(), "https://acme.com".to_string());

        assert_eq!(result.emails, vec!["sales@acme.com"]);
        assert_eq!(result.url, "https://acme.com");
    }

    #[test]
    fn merge_unions_without_duplicates_and_respects_caps() {
        let mut merged = ExtractedContacts {
            emails: vec!["sales@acme.com".to_string()],
            phones: vec!["+1 650-253-0000".to_string()],
        };
        merged.merge(ExtractedContacts {
            emails: vec!["sales@acme.com".to_string(), "hr@acme.com".to_string()],
            phones: vec![
                "+1 (650) 253 0000".to_string(),
                "+420 601 123 456".to_string(),
            ],
        });

        assert_eq!(merged.emails, vec!["sales@acme.com", "hr@acme.com"]);
        assert_eq!(merged.phones.len(), 2);
        assert_eq!(digits_only(&merged.phones[1]), "420601123456");
    }

    #[test]
    fn merge_is_capped() {
        let mut merged = ExtractedContacts::default();
        for n in 0..6 {
            merged.merge(ExtractedContacts {
                emails: vec![format!("person{}@acme.com", n)],
                phones: vec![format!("+1 650-253-000{}", n)],
            });
        }

        assert_eq!(merged.emails.len(), MAX_MATCHES);
        assert_eq!(merged.phones.len(), MAX_MATCHES);
        assert!(merged.is_full());
    }
}
