use notify_config::shared::{ApplicationConfig, HttpClientConfig, ValidationError};
use serde::{Deserialize, Serialize};

/// Location of the upstream notification producer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the producer service, without a trailing slash.
    pub base_url: String,
}

/// Top-level configuration for the gateway service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server settings.
    pub application: ApplicationConfig,
    /// Upstream producer location.
    pub upstream: UpstreamConfig,
    /// Pooled transport settings for the upstream client.
    #[serde(default)]
    pub http_client: HttpClientConfig,
}

impl GatewayConfig {
    /// Validates all nested configuration sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.http_client.validate()
    }
}
