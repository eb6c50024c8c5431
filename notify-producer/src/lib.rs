//! Stream producer service: aggregates per-user notifications and serves them as a
//! newline-delimited JSON stream.

pub mod config;
pub mod routes;
pub mod startup;
