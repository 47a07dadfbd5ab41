//! Ordered storage fallback chain.
//!
//! A chain holds storage tiers in priority order. Running it tries each tier
//! until one accepts the record, and keeps a log of every attempt so callers
//! can report which tier stored the record and why earlier tiers failed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::ports::StorageError;

/// One storage strategy in a fallback chain.
#[async_trait]
pub trait StorageTier<T: Sync>: Send + Sync {
    /// Short name used in logs and attempt records.
    fn name(&self) -> &'static str;

    /// Store `record`, returning the id the tier assigned.
    ///
    /// `failures` holds the attempts of every earlier tier, all failed.
    async fn store(&self, record: &T, failures: &[TierAttempt]) -> Result<String, StorageError>;
}

/// Outcome of trying one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierAttempt {
    pub tier: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TierAttempt {
    pub fn succeeded(&self) -> bool {
        self.storage_id.is_some()
    }
}

/// Every attempt made by one chain run, in tier order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainOutcome {
    pub attempts: Vec<TierAttempt>,
}

impl ChainOutcome {
    /// Index and attempt of the tier that stored the record.
    pub fn stored_by(&self) -> Option<(usize, &TierAttempt)> {
        self.attempts.iter().enumerate().find(|(_, a)| a.succeeded())
    }

    pub fn storage_id(&self) -> Option<&str> {
        self.stored_by().and_then(|(_, a)| a.storage_id.as_deref())
    }

    /// Error message recorded for tier `index`, if it failed.
    pub fn error_at(&self, index: usize) -> Option<&str> {
        self.attempts.get(index).and_then(|a| a.error.as_deref())
    }
}

/// Tiers tried in order until one succeeds.
pub struct FallbackChain<T: Sync> {
    tiers: Vec<Arc<dyn StorageTier<T>>>,
}

impl<T: Sync> FallbackChain<T> {
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Appends a tier with lower priority than every tier already present.
    pub fn then(mut self, tier: Arc<dyn StorageTier<T>>) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tries each tier in order, stopping at the first success.
    pub async fn run(&self, record: &T) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();

        for tier in &self.tiers {
            match tier.store(record, &outcome.attempts).await {
                Ok(storage_id) => {
                    tracing::debug!(tier = tier.name(), storage_id = %storage_id, "Tier stored record");
                    outcome.attempts.push(TierAttempt {
                        tier: tier.name(),
                        storage_id: Some(storage_id),
                        error: None,
                    });
                    break;
                }
                Err(e) => {
                    tracing::warn!(tier = tier.name(), error = %e, "Storage tier failed, falling back");
                    outcome.attempts.push(TierAttempt {
                        tier: tier.name(),
                        storage_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcome
    }
}

impl<T: Sync> Default for FallbackChain<T> {
    fn default() -> Self {
        Self::new()
    }
}
