use itertools::Itertools;
use once_cell::sync::Lazy;
use phonenumber::{country, Mode};
use regex::Regex;

use crate::domain::scrape::{digits_only, ExtractedContacts, MAX_MATCHES};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// Permissive on purpose: tolerant of +/00 prefixes, parenthesized area codes
// and -/./space separators. Validation decides what survives.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+|00)?\(?\d{1,4}\)?(?:[-.\s]?\d{1,4}){1,5}").unwrap());

/// Asset paths like `logo@2x.png` satisfy the email pattern; anything ending
/// in one of these is noise.
const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".bmp", ".avif",
];

/// Placeholder domains that show up in templates and demo markup.
const PLACEHOLDER_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "email.com",
    "domain.com",
    "yourdomain.com",
    "yourcompany.com",
    "mysite.com",
    "sentry.io",
    "wixpress.com",
];

/// Pure extraction over an arbitrary text blob. Empty input yields empty
/// sequences, never an error.
pub fn extract_contacts(text: &str, region: Option<country::Id>) -> ExtractedContacts {
    ExtractedContacts {
        emails: extract_emails(text),
        phones: extract_phones(text, region),
    }
}

pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|email| !ends_with_image_extension(email))
        .filter(|email| !has_placeholder_domain(email))
        .unique()
        .take(MAX_MATCHES)
        .collect()
}

pub fn extract_phones(text: &str, region: Option<country::Id>) -> Vec<String> {
    let mut phones: Vec<String> = vec![];
    let mut seen_digits: Vec<String> = vec![];

    for candidate in PHONE_RE.find_iter(text) {
        let raw = candidate.as_str().trim();
        let digits = digits_only(raw);
        if is_degenerate_digits(&digits) {
            continue;
        }
        let Some(formatted) = validate_and_format(raw, region) else {
            continue;
        };
        let normalized = digits_only(&formatted);
        if seen_digits.contains(&normalized) {
            continue;
        }
        seen_digits.push(normalized);
        phones.push(formatted);
    }

    // Internationally formatted numbers first; stable, so first-seen order
    // survives within each group.
    phones.sort_by_key(|phone| !phone.starts_with('+'));
    phones.truncate(MAX_MATCHES);
    phones
}

/// Library-grade validation: parse against the requested region, check the
/// number is plausible for its country plan, reformat to international form.
fn validate_and_format(raw: &str, region: Option<country::Id>) -> Option<String> {
    let parsed = phonenumber::parse(region, raw).ok().or_else(|| {
        // `00` is the common international call prefix; retry as `+`.
        let rest = raw.strip_prefix("00")?;
        phonenumber::parse(region, format!("+{}", rest)).ok()
    })?;

    if !phonenumber::is_valid(&parsed) {
        return None;
    }
    Some(parsed.format().mode(Mode::International).to_string())
}

/// Repeated-digit runs and too-short/too-long digit strings are never real
/// phone numbers, whatever the regex matched.
fn is_degenerate_digits(digits: &str) -> bool {
    if digits.len() < 7 || digits.len() > 15 {
        return true;
    }
    let mut run = 1;
    let mut previous = None;
    for digit in digits.chars() {
        if Some(digit) == previous {
            run += 1;
            if run >= 6 {
                return true;
            }
        } else {
            run = 1;
            previous = Some(digit);
        }
    }
    false
}

fn ends_with_image_extension(email: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| email.ends_with(ext))
}

fn has_placeholder_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, domain)) => PLACEHOLDER_DOMAINS
            .iter()
            .any(|blocked| domain == *blocked || domain.ends_with(&format!(".{}", blocked))),
        None => true,
    }
}
