//! Core pipeline for streaming per-user notifications.
//!
//! The crate hosts everything that is independent of HTTP: the notification data
//! model, the source abstraction with its synthetic implementations, the stream
//! aggregation pipeline (filter, order, batch, enrich), newline-delimited JSON
//! framing, and the shared error taxonomy.

pub mod error;
pub mod ndjson;
pub mod source;
pub mod stream;
pub mod types;
