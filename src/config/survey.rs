//! Survey content and fallback storage configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::foundation::BookletPool;

/// Survey configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    /// Number of booklets in the pool; ids are `0..booklet_count`
    #[serde(default = "default_booklet_count")]
    pub booklet_count: u32,

    /// Directory holding `<id>.json` booklet files
    #[serde(default = "default_booklets_dir")]
    pub booklets_dir: PathBuf,

    /// Remote content base URL; takes precedence over `booklets_dir`
    pub booklet_base_url: Option<String>,

    /// Timeout for remote booklet fetches in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Directory for local fallback records
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,

    /// Seconds without a request before a session is dropped from memory
    #[serde(default = "default_session_idle")]
    pub session_idle_secs: u64,

    /// Seconds between idle-session sweeps
    #[serde(default = "default_session_sweep")]
    pub session_sweep_secs: u64,
}

impl SurveyConfig {
    pub fn pool(&self) -> Result<BookletPool, ValidationError> {
        BookletPool::new(self.booklet_count).map_err(|_| ValidationError::InvalidBookletCount)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn session_sweep(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs)
    }

    /// Validate survey configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pool()?;
        if let Some(url) = &self.booklet_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidBookletBaseUrl);
            }
        }
        if self.fetch_timeout_secs == 0 || self.session_idle_secs == 0 || self.session_sweep_secs == 0
        {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            booklet_count: default_booklet_count(),
            booklets_dir: default_booklets_dir(),
            booklet_base_url: None,
            fetch_timeout_secs: default_fetch_timeout(),
            fallback_dir: default_fallback_dir(),
            session_idle_secs: default_session_idle(),
            session_sweep_secs: default_session_sweep(),
        }
    }
}

fn default_booklet_count() -> u32 {
    19
}

fn default_booklets_dir() -> PathBuf {
    PathBuf::from("booklets")
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("fallback")
}

fn default_session_idle() -> u64 {
    3600
}

fn default_session_sweep() -> u64 {
    60
}
