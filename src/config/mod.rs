//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config` and
//! `dotenvy` crates, with the `SPATIAL_SURVEY` prefix and `__` separating
//! nested values.
//!
//! # Example
//!
//! ```no_run
//! use spatial_survey::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod features;
mod redis;
mod server;
mod survey;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use self::redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use survey::SurveyConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; a bare environment yields an offline service
/// reading booklets from `./booklets` and writing fallbacks to `./fallback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Primary store; `None` runs in offline mode
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Counter store; `None` skips usage counting
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    #[serde(default)]
    pub survey: SurveyConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `SPATIAL_SURVEY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SPATIAL_SURVEY__DATABASE__URL=...` -> `database.url = ...`
    /// - `SPATIAL_SURVEY__SURVEY__BOOKLET_COUNT=19` -> `survey.booklet_count = 19`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SPATIAL_SURVEY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.survey.validate()?;
        Ok(())
    }

    /// True when no primary store is configured
    pub fn is_offline(&self) -> bool {
        self.database.is_none()
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
