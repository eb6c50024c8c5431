use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Batching and concurrency settings for the notification stream pipeline.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamConfig {
    /// Maximum number of records grouped into one enrichment batch.
    #[serde(default = "default_batch_max_size")]
    pub batch_max_size: usize,
    /// Maximum number of batches enriched concurrently.
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,
    /// Maximum number of records enriched concurrently within one batch.
    #[serde(default = "default_max_concurrent_enrichments")]
    pub max_concurrent_enrichments: usize,
}

impl StreamConfig {
    /// Default maximum batch size.
    pub const DEFAULT_BATCH_MAX_SIZE: usize = 100;

    /// Default number of batches in flight.
    pub const DEFAULT_MAX_CONCURRENT_BATCHES: usize = 4;

    /// Default number of per-batch enrichments in flight.
    pub const DEFAULT_MAX_CONCURRENT_ENRICHMENTS: usize = 4;

    /// Validates stream configuration settings.
    ///
    /// Every bound must be non-zero, otherwise the pipeline would stall.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_max_size == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "stream.batch_max_size",
                constraint: "must be greater than 0",
            });
        }

        if self.max_concurrent_batches == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "stream.max_concurrent_batches",
                constraint: "must be greater than 0",
            });
        }

        if self.max_concurrent_enrichments == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "stream.max_concurrent_enrichments",
                constraint: "must be greater than 0",
            });
        }

        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            batch_max_size: default_batch_max_size(),
            max_concurrent_batches: default_max_concurrent_batches(),
            max_concurrent_enrichments: default_max_concurrent_enrichments(),
        }
    }
}

fn default_batch_max_size() -> usize {
    StreamConfig::DEFAULT_BATCH_MAX_SIZE
}

fn default_max_concurrent_batches() -> usize {
    StreamConfig::DEFAULT_MAX_CONCURRENT_BATCHES
}

fn default_max_concurrent_enrichments() -> usize {
    StreamConfig::DEFAULT_MAX_CONCURRENT_ENRICHMENTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(StreamConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = StreamConfig {
            batch_max_size: 0,
            ..StreamConfig::default()
        };

        assert!(config.validate().is_err());
    }
}
