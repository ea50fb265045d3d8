pub mod default_route;
pub mod scrape_route;
pub mod search_route;
