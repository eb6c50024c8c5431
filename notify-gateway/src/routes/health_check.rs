use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, Responder, get};

/// Plain-text liveness probe.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("notification gateway is healthy")
}
