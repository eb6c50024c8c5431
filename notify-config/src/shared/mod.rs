//! Shared configuration types for the notification services.

mod application;
mod http_client;
mod stream;

pub use application::ApplicationConfig;
pub use http_client::HttpClientConfig;
pub use stream::StreamConfig;

use thiserror::Error;

/// Errors raised when a configuration value violates its constraints.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field holds a value outside its allowed range.
    #[error("invalid value for `{field}`: {constraint}")]
    InvalidFieldValue {
        field: &'static str,
        constraint: &'static str,
    },
}
