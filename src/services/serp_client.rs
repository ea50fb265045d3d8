use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::scrape::{SearchHit, UNKNOWN_NAME};

const SERP_API_URL: &str = "https://serpapi.com/search.json";
const NUM_RESULTS: u16 = 100;

/// Hosts that are search-engine plumbing or aggregators, never a business's
/// own site. Hits on these are filtered before they reach the scraper.
const BLACK_LIST_DOMAINS: &[&str] = &[
    "google.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "linkedin.com",
    "wikipedia.org",
    "yelp.com",
    "tripadvisor.com",
];

/// Client for the third-party search API that produces scrape candidates.
pub struct SerpClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize)]
struct SerpQuery {
    q: String,
    api_key: String,
    num: u16,
}

#[derive(Deserialize)]
struct SerpResponse {
    organic_results: Option<Vec<OrganicResult>>,
}

#[derive(Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
}

impl SerpClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .read_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client.");
        SerpClient { client, api_key }
    }

    /// Query the search API for `keywords` scoped to `country` and map the
    /// organic results into scrape candidates.
    pub async fn search(&self, keywords: &str, country: &str) -> anyhow::Result<Vec<SearchHit>> {
        let query = SerpQuery {
            q: format!("{} {}", keywords, country),
            api_key: self.api_key.clone(),
            num: NUM_RESULTS,
        };

        let response = self
            .client
            .get(SERP_API_URL)
            .query(&query)
            .send()
            .await
            .context("Search API request failed")?;

        let body: SerpResponse = response
            .json()
            .await
            .context("Invalid search API response structure")?;

        let results = body
            .organic_results
            .context("Invalid search API response structure")?;

        log::info!("Search API returned {} organic results", results.len());

        Ok(results
            .into_iter()
            .map(|result| SearchHit {
                title: Some(result.title.unwrap_or_else(|| UNKNOWN_NAME.to_string())),
                url: result.link.unwrap_or_default(),
            })
            .filter(|hit| !is_blacklisted(&hit.url))
            .collect())
    }
}

fn is_blacklisted(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => BLACK_LIST_DOMAINS
                .iter()
                .any(|blocked| host == *blocked || host.ends_with(&format!(".{}", blocked))),
            None => false,
        },
        // Unparseable URLs pass through; the scrape stage short-circuits
        // them into "Invalid URL" placeholders instead of dropping them.
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_succeeds() {
        // The builder must never fall back to a default client silently.
        let _client = SerpClient::new("test-key".to_string());
    }

    #[test]
    fn aggregator_hosts_are_blacklisted() {
        assert!(is_blacklisted("https://www.facebook.com/acme"));
        assert!(is_blacklisted("https://en.wikipedia.org/wiki/Acme"));
        assert!(is_blacklisted("https://support.google.com/websearch"));
    }

    #[test]
    fn business_sites_pass_the_blacklist() {
        assert!(!is_blacklisted("https://www.acme.com/"));
        assert!(!is_blacklisted("https://acme.co.uk/contact"));
    }

    #[test]
    fn invalid_urls_are_kept_for_the_scraper_to_report() {
        assert!(!is_blacklisted("not-a-url"));
        assert!(!is_blacklisted(""));
    }
}
