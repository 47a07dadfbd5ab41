//! Counter store (Redis) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Counter store configuration.
///
/// Optional; without it booklet assignment skips the usage counter.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// `redis://` or `rediss://` connection URL
    pub url: String,

    /// Hash holding per-booklet assignment counts
    #[serde(default = "default_stats_key")]
    pub stats_key: String,

    /// Seconds to wait for the initial connection
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SPATIAL_SURVEY__REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.stats_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SPATIAL_SURVEY__REDIS__STATS_KEY"));
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            stats_key: default_stats_key(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_stats_key() -> String {
    "booklet_stats".to_string()
}

fn default_timeout() -> u64 {
    5
}
