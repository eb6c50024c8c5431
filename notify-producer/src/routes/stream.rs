use actix_web::http::StatusCode;
use actix_web::web::{Data, Query};
use actix_web::{HttpResponse, ResponseError, get};
use notify_core::ndjson::{self, NDJSON_CONTENT_TYPE};
use notify_core::stream::NotificationStreamBuilder;
use notify_core::types::{ParameterError, validate_stream_params};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::routes::error_response;

/// Route path, echoed in structured error bodies.
const STREAM_PATH: &str = "/api/notifications/stream";

/// Query parameters of the stream endpoint, using the upstream wire names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub user_id: i64,
    pub limit: Option<i64>,
    pub filter: Option<String>,
}

/// Request rejections raised before the stream opens.
#[derive(Debug, Error)]
pub enum StreamRequestError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

impl ResponseError for StreamRequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            StreamRequestError::Parameter(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(
            self.status_code(),
            "Validation Error",
            self.to_string(),
            STREAM_PATH,
        )
    }
}

/// Streams a user's notifications as newline-delimited JSON.
///
/// Parameters are validated before the aggregator is invoked; failures are rejected
/// synchronously as a client error and never reach the stream machinery. Once the
/// response has started, an in-stream error aborts the remaining body.
#[get("/stream")]
pub async fn stream_notifications(
    query: Query<StreamQuery>,
    stream_builder: Data<NotificationStreamBuilder>,
) -> Result<HttpResponse, StreamRequestError> {
    let query = query.into_inner();

    info!(
        user_id = query.user_id,
        limit = ?query.limit,
        filter = ?query.filter,
        "received notification stream request"
    );

    validate_stream_params(query.user_id, query.limit).inspect_err(|error| {
        warn!(user_id = query.user_id, %error, "rejecting invalid stream request");
    })?;

    let stream = stream_builder.build_stream(
        query.user_id,
        query.limit.map(|limit| limit as usize),
        query.filter,
    );

    Ok(HttpResponse::Ok()
        .content_type(NDJSON_CONTENT_TYPE)
        .streaming(ndjson::encode(stream)))
}
