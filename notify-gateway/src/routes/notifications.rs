use actix_web::http::StatusCode;
use actix_web::web::{Data, Query};
use actix_web::{HttpResponse, ResponseError, get};
use notify_core::ndjson::{self, NDJSON_CONTENT_TYPE};
use serde::Deserialize;
use tracing::{info, warn};

use crate::client::{NotificationStreamClient, StreamClientError};
use crate::routes::error_response;

/// Route path, echoed in structured error bodies.
const NOTIFICATIONS_PATH: &str = "/api/client/notifications";

/// Query parameters of the gateway surface, using the upstream wire names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuery {
    pub user_id: i64,
    pub limit: Option<i64>,
    pub filter: Option<String>,
}

impl ResponseError for StreamClientError {
    fn status_code(&self) -> StatusCode {
        match self {
            StreamClientError::Parameter(_) => StatusCode::BAD_REQUEST,
            StreamClientError::PoolExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StreamClientError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            StreamClientError::Transport(_)
            | StreamClientError::Upstream { .. }
            | StreamClientError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            StreamClientError::Parameter(_) => "Validation Error",
            StreamClientError::PoolExhausted { .. } => "Service Unavailable",
            StreamClientError::Timeout { .. } => "Gateway Timeout",
            StreamClientError::Transport(_)
            | StreamClientError::Upstream { .. }
            | StreamClientError::Decode(_) => "Upstream Error",
        };

        error_response(
            self.status_code(),
            error,
            self.to_string(),
            NOTIFICATIONS_PATH,
        )
    }
}

/// Proxies a user's notification stream from the producer as newline-delimited JSON.
///
/// Validation and the upstream status check happen before the response starts, so
/// those failures arrive as structured error bodies; an error mid-stream aborts the
/// remaining body.
#[get("/notifications")]
pub async fn stream_notifications(
    query: Query<ClientQuery>,
    client: Data<NotificationStreamClient>,
) -> Result<HttpResponse, StreamClientError> {
    let query = query.into_inner();

    info!(
        user_id = query.user_id,
        limit = ?query.limit,
        filter = ?query.filter,
        "client received notification request"
    );

    let stream = client
        .stream_notifications(query.user_id, query.limit, query.filter.as_deref())
        .await
        .inspect_err(|error| {
            warn!(user_id = query.user_id, %error, "failed to open notification stream");
        })?;

    Ok(HttpResponse::Ok()
        .content_type(NDJSON_CONTENT_TYPE)
        .streaming(ndjson::encode(stream)))
}
