use actix_web::{get, HttpRequest, HttpResponse, Responder};

#[get("/")]
async fn default(req: HttpRequest) -> impl Responder {
    match actix_files::NamedFile::open_async("./static/index.html").await {
        Ok(file) => file.into_response(&req),
        Err(_) => HttpResponse::Ok().body("magnet is running"),
    }
}
