use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::domain::scrape::SearchHit;
use crate::services::{ScrapeError, ScrapeOrchestrator};

#[derive(Deserialize)]
pub struct ScrapeRequest {
    urls: Vec<SearchHit>,
    country: Option<String>,
}

/// Scrape contact information from every supplied URL. The response array
/// always matches the request order and length; individual failures come
/// back as placeholder entries rather than aborting the batch.
#[post("")]
async fn scrape(
    orchestrator: web::Data<ScrapeOrchestrator>,
    body: web::Json<ScrapeRequest>,
) -> HttpResponse {
    let ScrapeRequest { urls, country } = body.into_inner();

    if urls.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid input: 'urls' must be a non-empty array."
        }));
    }

    match orchestrator.scrape_batch(urls, country.as_deref()).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e @ ScrapeError::InvalidCountry(_)) => {
            log::error!("Rejected scrape batch: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
        Err(e @ ScrapeError::AutomationLaunch(_)) => {
            log::error!("Error launching browser: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}
