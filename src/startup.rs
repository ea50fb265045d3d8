use std::net::TcpListener;

use actix_files::Files;
use actix_web::{
    dev::Server,
    middleware::Logger,
    web, App, HttpServer,
};

use crate::{
    routes::{default_route, scrape_route, search_route},
    services::{ScrapeOrchestrator, SerpClient},
};

pub fn run(
    listener: TcpListener,
    serp_client: SerpClient,
    orchestrator: ScrapeOrchestrator,
) -> Result<Server, std::io::Error> {
    let serp_client = web::Data::new(serp_client);
    let orchestrator = web::Data::new(orchestrator);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./static").prefer_utf8(true))
            .service(default_route::default)
            .service(web::scope("/search").service(search_route::search))
            .service(web::scope("/scrape").service(scrape_route::scrape))
            .app_data(serp_client.clone())
            .app_data(orchestrator.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
