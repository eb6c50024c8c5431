//! Error types for the notification stream pipeline.

use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can terminate an in-flight notification stream.
///
/// None of these reach the caller before the stream opens; parameter validation is
/// handled separately and rejected synchronously. Once a stream is running, the first
/// error aborts the remaining sequence and already-emitted records stand.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A notification source failed while listing candidate records.
    #[error("notification source `{source_name}` failed: {reason}")]
    Source {
        source_name: String,
        reason: String,
    },

    /// Enriching a single record failed; classified as an internal processing fault.
    #[error("failed to enrich notification {id}: {reason}")]
    Enrichment { id: i64, reason: String },

    /// A record could not be encoded onto the wire.
    #[error("failed to encode notification record: {0}")]
    Serialization(#[from] serde_json::Error),
}
