//! Primary consent store port.

use async_trait::async_trait;

use crate::domain::consent::ConsentDraft;

use super::StorageError;

/// Durable store for consent records.
#[async_trait]
pub trait ConsentStore: Send + Sync {
    /// Persist `draft` and return the id the store assigned.
    ///
    /// Saving the same session twice must not create a second record.
    async fn save(&self, draft: &ConsentDraft) -> Result<String, StorageError>;

    /// Cheap round trip proving the store is reachable.
    async fn health_check(&self) -> Result<(), StorageError>;
}
