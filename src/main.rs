use std::net::TcpListener;

use env_logger::Env;
use magnet::{
    configuration::get_configuration,
    domain::language::LanguagePatternSet,
    services::{ScrapeOrchestrator, SerpClient},
    startup::run,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let patterns = LanguagePatternSet::from_file(&configuration.scraper.language_patterns_path)
        .expect("Failed to load language patterns.");
    log::info!("Loaded language patterns for {} countries", patterns.len());

    let serp_client = SerpClient::new(configuration.api_keys.serp_api.clone());
    let orchestrator = ScrapeOrchestrator::new(patterns, &configuration.scraper);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;
    log::info!("Server running on http://{}", listener.local_addr()?);

    run(listener, serp_client, orchestrator)?.await
}
