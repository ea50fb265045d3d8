use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::services::SerpClient;

#[derive(Deserialize)]
pub struct SearchRequest {
    keywords: String,
    country: String,
}

/// Look up businesses matching the keywords in the given country and return
/// them as scrape candidates.
#[post("")]
async fn search(
    serp_client: web::Data<SerpClient>,
    body: web::Json<SearchRequest>,
) -> HttpResponse {
    match serp_client.search(&body.keywords, &body.country).await {
        Ok(hits) => HttpResponse::Ok().json(hits),
        Err(e) => {
            log::error!("Search API error: {:?}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}
