//! Streaming client for the upstream notification producer.
//!
//! Requests go out over a pooled transport with independent connect/read timeouts.
//! On top of that, every request carries an overall response deadline enforced on
//! the client side, and a connection lease taken from a bounded pool; both the
//! lease and the deadline travel with the returned stream so cancellation and
//! completion release them deterministically.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{Stream, TryStreamExt};
use notify_config::shared::HttpClientConfig;
use notify_core::ndjson::{NDJSON_CONTENT_TYPE, NdjsonDecoder};
use notify_core::types::{NotificationRecord, ParameterError, validate_stream_params};
use pin_project_lite::pin_project;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Instant, Sleep};
use tracing::{debug, error, info};

/// Errors surfaced by the streaming client.
#[derive(Debug, Error)]
pub enum StreamClientError {
    /// A request parameter failed local validation; no network work was done.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// No pooled connection became available within the acquisition deadline.
    #[error("connection pool exhausted: all {max_connections} connections in use")]
    PoolExhausted { max_connections: usize },

    /// The transport failed while connecting, sending, or reading.
    #[error("transport error while streaming notifications: {0}")]
    Transport(#[from] reqwest::Error),

    /// The producer answered with a non-success status; carries the error body.
    #[error("notification producer returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// The overall response deadline passed before the stream completed.
    #[error("notification stream timed out after {}ms for user {user_id}", timeout.as_millis())]
    Timeout { timeout: Duration, user_id: i64 },

    /// A streamed line could not be decoded as a notification record.
    #[error("failed to decode notification record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Pooled, deadline-guarded client for the producer's stream endpoint.
#[derive(Clone)]
pub struct NotificationStreamClient {
    http: reqwest::Client,
    base_url: String,
    permits: Arc<Semaphore>,
    max_connections: usize,
    acquire_timeout: Duration,
    response_timeout: Duration,
}

impl NotificationStreamClient {
    /// Builds the client over a connection pool configured from `config`.
    pub fn new(base_url: String, config: HttpClientConfig) -> Result<Self, StreamClientError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(config.max_connections)
            .pool_idle_timeout(config.idle_timeout())
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            base_url,
            permits: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
            acquire_timeout: config.connect_timeout(),
            response_timeout: config.response_timeout(),
        })
    }

    /// Requests the notification stream for one user and re-emits each record as it
    /// is decoded.
    ///
    /// Parameters are validated locally before any connection is leased. A
    /// non-success upstream status is read fully and surfaced as
    /// [`StreamClientError::Upstream`]. Dropping the returned stream closes the
    /// underlying connection and returns the lease to the pool.
    pub async fn stream_notifications(
        &self,
        user_id: i64,
        limit: Option<i64>,
        filter: Option<&str>,
    ) -> Result<
        impl Stream<Item = Result<NotificationRecord, StreamClientError>> + std::fmt::Debug + use<>,
        StreamClientError,
    > {
        validate_stream_params(user_id, limit)?;

        let permit = self.acquire_connection().await?;
        let deadline = Instant::now() + self.response_timeout;

        let url = self.stream_url(user_id, limit, filter);
        debug!(user_id, %url, "requesting notification stream from producer");

        let request = self
            .http
            .get(&url)
            .header(ACCEPT, NDJSON_CONTENT_TYPE)
            .send();
        let response = tokio::time::timeout_at(deadline, request)
            .await
            .map_err(|_| StreamClientError::Timeout {
                timeout: self.response_timeout,
                user_id,
            })??;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(user_id, %status, %body, "producer returned an error response");

            return Err(StreamClientError::Upstream { status, body });
        }

        info!(user_id, "streaming notifications from producer");

        let records = NdjsonDecoder::<NotificationRecord, _>::wrap(
            response.bytes_stream().map_err(StreamClientError::from),
        );

        Ok(DeadlineStream::new(
            records,
            deadline,
            self.response_timeout,
            user_id,
            permit,
        ))
    }

    /// Leases one connection from the bounded pool.
    ///
    /// Waiting is capped by the connect timeout so exhaustion surfaces as an error
    /// instead of queueing indefinitely.
    async fn acquire_connection(&self) -> Result<OwnedSemaphorePermit, StreamClientError> {
        let exhausted = StreamClientError::PoolExhausted {
            max_connections: self.max_connections,
        };

        tokio::time::timeout(
            self.acquire_timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        .map_err(|_| exhausted)?
        .map_err(|_| StreamClientError::PoolExhausted {
            max_connections: self.max_connections,
        })
    }

    fn stream_url(&self, user_id: i64, limit: Option<i64>, filter: Option<&str>) -> String {
        let mut url = format!("{}/api/notifications/stream?userId={user_id}", self.base_url);

        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }

        if let Some(filter) = filter
            && !filter.is_empty()
        {
            url.push_str(&format!("&filter={filter}"));
        }

        url
    }
}

pin_project! {
    /// Record stream guarded by the overall response deadline.
    ///
    /// Holds the pool lease for the duration of the stream; dropping the stream
    /// (caller cancellation) releases the lease and closes the connection. When the
    /// deadline fires mid-stream, one timeout-classified error is emitted and the
    /// sequence ends; records already delivered stand. Any other error likewise
    /// ends the sequence after it is emitted.
    #[must_use = "streams do nothing unless polled"]
    struct DeadlineStream<S> {
        #[pin]
        stream: S,
        #[pin]
        delay: Sleep,
        timeout: Duration,
        user_id: i64,
        done: bool,
        _permit: OwnedSemaphorePermit,
    }
}

impl<S> std::fmt::Debug for DeadlineStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineStream")
            .field("timeout", &self.timeout)
            .field("user_id", &self.user_id)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<S> DeadlineStream<S> {
    fn new(
        stream: S,
        deadline: Instant,
        timeout: Duration,
        user_id: i64,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        Self {
            stream,
            delay: tokio::time::sleep_until(deadline),
            timeout,
            user_id,
            done: false,
            _permit: permit,
        }
    }
}

impl<S> Stream for DeadlineStream<S>
where
    S: Stream<Item = Result<NotificationRecord, StreamClientError>>,
{
    type Item = Result<NotificationRecord, StreamClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        if this.delay.poll(cx).is_ready() {
            *this.done = true;

            return Poll::Ready(Some(Err(StreamClientError::Timeout {
                timeout: *this.timeout,
                user_id: *this.user_id,
            })));
        }

        match this.stream.poll_next(cx) {
            Poll::Ready(Some(Ok(record))) => {
                debug!(
                    id = record.id,
                    kind = %record.kind,
                    "received notification from producer"
                );

                Poll::Ready(Some(Ok(record)))
            }
            Poll::Ready(Some(Err(err))) => {
                *this.done = true;

                Poll::Ready(Some(Err(err)))
            }
            other => other,
        }
    }
}
