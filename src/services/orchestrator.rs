use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use phonenumber::country;
use regex::Regex;
use thirtyfour::error::{WebDriverError, WebDriverResult};
use thirtyfour::WebDriver;
use url::Url;

use crate::configuration::ScraperSettings;
use crate::domain::language::{contact_link_regex, skip_link_regex, LanguagePatternSet};
use crate::domain::scrape::{ExtractedContacts, HitOutcome, ScrapeResult, SearchHit};
use crate::services::contact_locator::find_contact_links;
use crate::services::droid::Droid;
use crate::services::extractor::extract_contacts;
use crate::services::harvester::harvest_page;

/// Batch-level failures. Per-hit failures never surface here; they are
/// folded into the hit's own result.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("No language data for country '{0}'")]
    InvalidCountry(String),
    #[error("Failed to launch browser automation: {0}")]
    AutomationLaunch(#[from] WebDriverError),
}

/// Per-hit admission decision. Hits without a usable URL resolve to their
/// placeholder result up front; only the rest are handed to the browser.
#[derive(Debug)]
enum HitPlan {
    Scrape(SearchHit),
    Placeholder(ScrapeResult),
}

/// Validate every hit, keeping input order. Each slot either carries the hit
/// through to the browser or the placeholder standing in for it.
fn plan_hits(hits: Vec<SearchHit>) -> Vec<HitPlan> {
    hits.into_iter()
        .map(|hit| {
            if hit.has_scrapable_url() {
                HitPlan::Scrape(hit)
            } else {
                log::error!("Skipping hit with invalid url: {:?}", hit.url);
                HitPlan::Placeholder(ScrapeResult::invalid_url(hit.display_name()))
            }
        })
        .collect()
}

/// Walk the candidate pages in order, harvesting each into `contacts` until
/// the cap is reached. The landing source is reused when a candidate is the
/// page already loaded. A fetch failure ends the visits for this hit; the
/// caller ships whatever was merged before it.
async fn visit_candidates<E, F, Fut>(
    candidates: Vec<String>,
    mut current: String,
    landing_source: String,
    region: Option<country::Id>,
    contacts: &mut ExtractedContacts,
    mut fetch: F,
) -> Result<(), E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    let mut visited: HashSet<String> = HashSet::new();

    for candidate in candidates {
        if contacts.is_full() {
            break;
        }
        if !visited.insert(candidate.clone()) {
            continue;
        }

        let page_source = if candidate == current {
            landing_source.clone()
        } else {
            let source = fetch(candidate.clone()).await?;
            current = candidate;
            source
        };

        let corpus = harvest_page(&page_source);
        contacts.merge(extract_contacts(&corpus, region));
    }

    Ok(())
}

/// Drives one browsing session per input hit: load the landing page, follow
/// the located contact links, harvest and extract each visited page, merge
/// per hit. Owns no ambient state; the language table and scraper settings
/// are injected at construction.
pub struct ScrapeOrchestrator {
    patterns: LanguagePatternSet,
    webdriver_url: String,
    page_load_timeout: Duration,
    concurrency: usize,
}

impl ScrapeOrchestrator {
    pub fn new(patterns: LanguagePatternSet, settings: &ScraperSettings) -> Self {
        ScrapeOrchestrator {
            patterns,
            webdriver_url: settings.webdriver_url.clone(),
            page_load_timeout: Duration::from_secs(settings.page_load_timeout_secs),
            concurrency: settings.concurrency.max(1),
        }
    }

    /// Scrape every hit, in order. The output always has the same length and
    /// order as the input; invalid and failed hits come back as placeholder
    /// or partial entries. The country gate and per-hit URL validation run
    /// before any browser work, and a batch with nothing to scrape never
    /// launches one.
    pub async fn scrape_batch(
        &self,
        hits: Vec<SearchHit>,
        country: Option<&str>,
    ) -> Result<Vec<ScrapeResult>, ScrapeError> {
        let country_patterns = match country {
            Some(name) => Some(
                self.patterns
                    .get(name)
                    .ok_or_else(|| ScrapeError::InvalidCountry(name.to_string()))?,
            ),
            None => None,
        };

        let contact_pattern = contact_link_regex(country_patterns);
        let skip_pattern = skip_link_regex(country_patterns);
        let region = country_patterns.and_then(|patterns| patterns.phone_region());

        let plans = plan_hits(hits);
        if !plans.iter().any(|plan| matches!(plan, HitPlan::Scrape(_))) {
            log::info!("No scrapable urls in batch of {}", plans.len());
            return Ok(plans
                .into_iter()
                .map(|plan| match plan {
                    HitPlan::Placeholder(result) => result,
                    // Unreachable behind the any() check above.
                    HitPlan::Scrape(hit) => ScrapeResult::invalid_url(hit.display_name()),
                })
                .collect());
        }

        let droid = Droid::launch(&self.webdriver_url, self.concurrency, self.page_load_timeout)
            .await
            .map_err(ScrapeError::AutomationLaunch)?;

        log::info!(
            "Scraping {} hits with {} browser sessions",
            plans.len(),
            droid.pool_size()
        );

        let contact_pattern = &contact_pattern;
        let skip_pattern = &skip_pattern;
        let results = stream::iter(plans.into_iter().enumerate())
            .map(|(index, plan)| {
                let driver = droid.driver(index).clone();
                async move {
                    match plan {
                        HitPlan::Placeholder(result) => result,
                        HitPlan::Scrape(hit) => {
                            self.scrape_hit(driver, hit, contact_pattern, skip_pattern, region)
                                .await
                        }
                    }
                }
            })
            .buffered(droid.pool_size())
            .collect::<Vec<ScrapeResult>>()
            .await;

        droid.quit().await;
        Ok(results)
    }

    /// Scrape one pre-validated hit in an isolated tab. Infallible by
    /// contract: every failure mode collapses into a result entry.
    async fn scrape_hit(
        &self,
        driver: WebDriver,
        hit: SearchHit,
        contact_pattern: &Regex,
        skip_pattern: &Regex,
        region: Option<country::Id>,
    ) -> ScrapeResult {
        let name = hit.display_name();

        let mut contacts = ExtractedContacts::default();
        let outcome = match self
            .visit_in_tab(&driver, &hit.url, contact_pattern, skip_pattern, region, &mut contacts)
            .await
        {
            Ok(()) => HitOutcome::Success(contacts),
            Err(e) => HitOutcome::Partial(contacts, e.to_string()),
        };

        outcome.into_result(name, hit.url)
    }

    /// Open a fresh tab for this hit and guarantee it is closed again,
    /// whatever happened inside.
    async fn visit_in_tab(
        &self,
        driver: &WebDriver,
        url: &str,
        contact_pattern: &Regex,
        skip_pattern: &Regex,
        region: Option<country::Id>,
        contacts: &mut ExtractedContacts,
    ) -> WebDriverResult<()> {
        let tab = driver.new_tab().await?;
        driver.switch_to_window(tab).await?;

        let outcome = self
            .visit_candidate_pages(driver, url, contact_pattern, skip_pattern, region, contacts)
            .await;

        if let Err(e) = driver.close_window().await {
            log::error!("Failed to close tab for {}: {}", url, e);
        }
        if let Ok(windows) = driver.windows().await {
            if let Some(first) = windows.into_iter().next() {
                let _ = driver.switch_to_window(first).await;
            }
        }

        outcome
    }

    async fn visit_candidate_pages(
        &self,
        driver: &WebDriver,
        url: &str,
        contact_pattern: &Regex,
        skip_pattern: &Regex,
        region: Option<country::Id>,
        contacts: &mut ExtractedContacts,
    ) -> WebDriverResult<()> {
        driver.goto(url).await?;
        let landing_source = driver.source().await?;

        // `current` tracks the page the driver is on, in the same form the
        // locator emits, so the self-fallback reuses the landing source
        // instead of reloading.
        let (candidates, current) = match Url::parse(url) {
            Ok(base) => (
                find_contact_links(&landing_source, &base, contact_pattern, skip_pattern),
                base.to_string(),
            ),
            Err(_) => (vec![url.to_string()], url.to_string()),
        };

        log::info!("Found {} candidate pages on {}", candidates.len(), url);

        visit_candidates(
            candidates,
            current,
            landing_source,
            region,
            contacts,
            |candidate| async move {
                driver.goto(&candidate).await?;
                driver.source().await
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ScraperSettings;
    use std::cell::Cell;

    fn settings() -> ScraperSettings {
        ScraperSettings {
            // Port 1 refuses connections, so any stray launch attempt fails
            // loudly instead of hitting a real webdriver.
            webdriver_url: "http://127.0.0.1:1".to_string(),
            page_load_timeout_secs: 30,
            concurrency: 0,
            language_patterns_path: "language_patterns.json".to_string(),
        }
    }

    fn orchestrator() -> ScrapeOrchestrator {
        let patterns = LanguagePatternSet::from_json(
            r#"{"Germany": {
                "iso_code": "DE",
                "contact": ["kontakt"],
                "about_us": ["impressum"],
                "cart": ["warenkorb"],
                "checkout": ["kasse"],
                "customer_support": ["kundendienst"]
            }}"#,
        )
        .unwrap();
        ScrapeOrchestrator::new(patterns, &settings())
    }

    fn hit(title: &str, url: &str) -> SearchHit {
        SearchHit {
            title: Some(title.to_string()),
            url: url.to_string(),
        }
    }

    #[test]
    fn concurrency_is_clamped_to_at_least_one() {
        assert_eq!(orchestrator().concurrency, 1);
    }

    #[tokio::test]
    async fn unknown_country_fails_before_any_navigation() {
        // The webdriver endpoint is never contacted: the country gate runs
        // first, so this returns without attempting a launch.
        let result = orchestrator()
            .scrape_batch(vec![hit("X", "https://acme.com")], Some("Nowhere"))
            .await;

        match result {
            Err(ScrapeError::InvalidCountry(name)) => assert_eq!(name, "Nowhere"),
            other => panic!("Expected InvalidCountry, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn planning_preserves_order_and_marks_invalid_hits() {
        let plans = plan_hits(vec![
            hit("A", "https://a.com"),
            hit("B", "not-a-url"),
            hit("C", "https://c.com"),
        ]);

        assert_eq!(plans.len(), 3);
        assert!(matches!(&plans[0], HitPlan::Scrape(h) if h.url == "https://a.com"));
        match &plans[1] {
            HitPlan::Placeholder(result) => {
                assert_eq!(result.name, "B");
                assert_eq!(result.url, "Invalid URL");
            }
            other => panic!("Expected a placeholder, got {:?}", other),
        }
        assert!(matches!(&plans[2], HitPlan::Scrape(h) if h.url == "https://c.com"));
    }

    #[tokio::test]
    async fn batch_without_scrapable_urls_returns_ordered_placeholders() {
        // None of these reach the browser; the dead webdriver endpoint in
        // settings() would fail the batch if a launch were attempted.
        let results = orchestrator()
            .scrape_batch(
                vec![hit("A", ""), hit("B", "ftp://b.com"), hit("C", "not-a-url")],
                Some("Germany"),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        for result in &results {
            assert_eq!(result.url, "Invalid URL");
            assert!(result.emails.is_empty());
            assert!(result.phones.is_empty());
        }
    }

    #[tokio::test]
    async fn candidate_fetch_failure_stops_visits_but_keeps_earlier_finds() {
        let mut contacts = ExtractedContacts::default();
        let fetches = Cell::new(0);

        let result = visit_candidates(
            vec![
                "https://acme.com/".to_string(),
                "https://acme.com/contact".to_string(),
                "https://acme.com/about".to_string(),
            ],
            "https://acme.com/".to_string(),
            "<html><body><p>sales@acme.com</p></body></html>".to_string(),
            None,
            &mut contacts,
            |_url| {
                fetches.set(fetches.get() + 1);
                async { Err("connection reset".to_string()) }
            },
        )
        .await;

        // The failure surfaces to the caller, which downgrades the hit to a
        // partial result carrying the landing-page find.
        assert_eq!(result, Err("connection reset".to_string()));
        assert_eq!(fetches.get(), 1);
        assert_eq!(contacts.emails, vec!["sales@acme.com"]);
    }

    #[tokio::test]
    async fn self_fallback_reuses_the_landing_source_without_a_fetch() {
        let mut contacts = ExtractedContacts::default();
        let fetches = Cell::new(0);

        let result = visit_candidates(
            vec!["https://acme.com/".to_string()],
            "https://acme.com/".to_string(),
            "<html><body><p>sales@acme.com</p></body></html>".to_string(),
            None,
            &mut contacts,
            |_url| {
                fetches.set(fetches.get() + 1);
                async { Ok::<String, String>(String::new()) }
            },
        )
        .await;

        assert_eq!(result, Ok(()));
        assert_eq!(fetches.get(), 0);
        assert_eq!(contacts.emails, vec!["sales@acme.com"]);
    }

    #[tokio::test]
    async fn visits_stop_once_the_phone_cap_is_reached() {
        let mut contacts = ExtractedContacts::default();
        for n in 0..4 {
            contacts.phones.push(format!("+1 650-253-000{}", n));
        }
        let fetches = Cell::new(0);

        let result = visit_candidates(
            vec!["https://acme.com/contact".to_string()],
            "https://acme.com/".to_string(),
            String::new(),
            None,
            &mut contacts,
            |_url| {
                fetches.set(fetches.get() + 1);
                async { Ok::<String, String>(String::new()) }
            },
        )
        .await;

        assert_eq!(result, Ok(()));
        assert_eq!(fetches.get(), 0);
    }
}
