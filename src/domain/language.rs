use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use phonenumber::country;
use regex::Regex;
use serde::Deserialize;

/// Localized keyword variants for one country, keyed by link intent.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryPatterns {
    pub iso_code: String,
    pub contact: Vec<String>,
    pub about_us: Vec<String>,
    pub cart: Vec<String>,
    pub checkout: Vec<String>,
    pub customer_support: Vec<String>,
}

/// English keywords always included in the contact-link pattern, whatever the
/// requested country. Sites in any market frequently label these in English.
const ENGLISH_CONTACT: &[&str] = &[
    "contact",
    "contact us",
    "about us",
    "about",
    "support",
    "customer service",
    "get in touch",
    "reach us",
];

const ENGLISH_SKIP: &[&str] = &["cart", "checkout", "basket"];

/// Read-only table mapping country display names to their keyword variants.
/// Loaded once at startup and handed to the orchestrator at construction.
#[derive(Debug, Clone)]
pub struct LanguagePatternSet {
    countries: HashMap<String, CountryPatterns>,
}

impl LanguagePatternSet {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read language patterns from {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let countries: HashMap<String, CountryPatterns> =
            serde_json::from_str(raw).context("Failed to parse language pattern table")?;
        Ok(LanguagePatternSet { countries })
    }

    /// Lookup is by exact country display name. A miss is the caller's
    /// `InvalidCountry` condition, not a silent fallback.
    pub fn get(&self, country: &str) -> Option<&CountryPatterns> {
        self.countries.get(country)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl CountryPatterns {
    /// Region used to parse phone numbers that carry no international prefix.
    pub fn phone_region(&self) -> Option<country::Id> {
        self.iso_code.parse::<country::Id>().ok()
    }
}

/// Case-insensitive alternation of the country's contact/about/support
/// variants plus the English fallback set. `None` builds the English-only
/// pattern used when no country was requested.
pub fn contact_link_regex(country: Option<&CountryPatterns>) -> Regex {
    let mut keywords: Vec<&str> = ENGLISH_CONTACT.to_vec();
    if let Some(patterns) = country {
        keywords.extend(
            patterns
                .contact
                .iter()
                .chain(patterns.about_us.iter())
                .chain(patterns.customer_support.iter())
                .map(String::as_str),
        );
    }
    build_alternation(&keywords)
}

/// Anchors matching this pattern are vetoed even when the contact pattern
/// matched. Keeps cart/checkout links out of the candidate list since words
/// like "kasse" or "panier" share letters with support vocabulary in some
/// languages.
pub fn skip_link_regex(country: Option<&CountryPatterns>) -> Regex {
    let mut keywords: Vec<&str> = ENGLISH_SKIP.to_vec();
    if let Some(patterns) = country {
        keywords.extend(
            patterns
                .cart
                .iter()
                .chain(patterns.checkout.iter())
                .map(String::as_str),
        );
    }
    build_alternation(&keywords)
}

fn build_alternation(keywords: &[&str]) -> Regex {
    let escaped: Vec<String> = keywords
        .iter()
        .filter(|kw| !kw.trim().is_empty())
        .map(|kw| regex::escape(kw.trim()))
        .collect();
    let pattern = format!("(?i)({})", escaped.join("|"));

    // Every branch is an escaped literal, so this cannot fail to compile.
    Regex::new(&pattern).unwrap_or_else(|_| Regex::new("(?i)contact").unwrap())
}
