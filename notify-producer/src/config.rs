use notify_config::shared::{ApplicationConfig, StreamConfig, ValidationError};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the producer service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// HTTP server settings.
    pub application: ApplicationConfig,
    /// Stream pipeline batching and concurrency settings.
    #[serde(default)]
    pub stream: StreamConfig,
}

impl ProducerConfig {
    /// Validates all nested configuration sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.stream.validate()
    }
}
