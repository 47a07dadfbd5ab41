//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeatureFlags {
    /// Include underlying error detail in 5xx bodies. Keep off in production.
    #[serde(default)]
    pub verbose_errors: bool,
}
