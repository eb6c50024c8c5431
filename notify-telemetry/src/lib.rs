//! Telemetry initialization shared by the notification service binaries.

pub mod tracing;
