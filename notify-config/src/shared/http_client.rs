use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Pooled HTTP transport settings for the upstream notification client.
///
/// Transport-level timeouts (connect/read) are independent from the overall
/// per-request response deadline, which is enforced separately on the client side.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpClientConfig {
    /// Maximum number of connections leased out concurrently.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// How long an idle pooled connection is kept before eviction, in milliseconds.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// TCP connect timeout, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Socket read timeout, in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Overall per-request response deadline, in milliseconds.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl HttpClientConfig {
    /// Default maximum number of pooled connections.
    pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

    /// Default idle eviction timeout (30 minutes).
    pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30 * 60 * 1000;

    /// Default connect timeout (10 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

    /// Default read timeout (20 seconds).
    pub const DEFAULT_READ_TIMEOUT_MS: u64 = 20_000;

    /// Default overall response deadline (20 seconds).
    pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 20_000;

    /// Returns the idle eviction timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Returns the connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Returns the overall response deadline as a [`Duration`].
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Validates HTTP client configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_connections == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "http_client.max_connections",
                constraint: "must be greater than 0",
            });
        }

        if self.response_timeout_ms == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "http_client.response_timeout_ms",
                constraint: "must be greater than 0",
            });
        }

        Ok(())
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            idle_timeout_ms: default_idle_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

fn default_max_connections() -> usize {
    HttpClientConfig::DEFAULT_MAX_CONNECTIONS
}

fn default_idle_timeout_ms() -> u64 {
    HttpClientConfig::DEFAULT_IDLE_TIMEOUT_MS
}

fn default_connect_timeout_ms() -> u64 {
    HttpClientConfig::DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_read_timeout_ms() -> u64 {
    HttpClientConfig::DEFAULT_READ_TIMEOUT_MS
}

fn default_response_timeout_ms() -> u64 {
    HttpClientConfig::DEFAULT_RESPONSE_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_connection_provider_settings() {
        let config = HttpClientConfig::default();

        assert_eq!(config.max_connections, 100);
        assert_eq!(config.idle_timeout(), Duration::from_secs(30 * 60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_connections_is_rejected() {
        let config = HttpClientConfig {
            max_connections: 0,
            ..HttpClientConfig::default()
        };

        assert!(config.validate().is_err());
    }
}
