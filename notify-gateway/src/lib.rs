//! Gateway service: pulls notification streams from the producer over a pooled,
//! timeout-guarded HTTP transport and re-exposes them to its own callers.

pub mod client;
pub mod config;
pub mod routes;
pub mod startup;
