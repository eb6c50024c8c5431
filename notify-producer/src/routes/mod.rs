mod health_check;
mod stream;

pub use health_check::*;
pub use stream::{StreamQuery, StreamRequestError, stream_notifications};

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use notify_core::types::ErrorResponse;

/// Builds a structured error response with the shared body shape.
pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    message: String,
    path: &str,
) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(status.as_u16(), error, message, path))
}
