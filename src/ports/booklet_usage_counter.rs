//! Per-booklet usage counter port.

use async_trait::async_trait;

use crate::domain::foundation::BookletId;

use super::StorageError;

/// Shared counter recording how often each booklet was handed out.
///
/// Increments are best-effort; callers never let a failure reach the
/// participant.
#[async_trait]
pub trait BookletUsageCounter: Send + Sync {
    /// Adds one to the counter for `id`, returning the new count.
    async fn increment(&self, id: BookletId) -> Result<u64, StorageError>;

    /// Current count for `id` (0 if never incremented).
    async fn count(&self, id: BookletId) -> Result<u64, StorageError>;
}
