//! Primary store for completed survey results.

use async_trait::async_trait;

use crate::domain::survey::{CompletionSummary, IntakeInfo, ResponseBundle};

use super::StorageError;

/// Durable store for a finished session's bundle, intake answers and summary.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Persist one completed session and return the assigned id.
    async fn save(
        &self,
        bundle: &ResponseBundle,
        intake: &IntakeInfo,
        summary: &CompletionSummary,
    ) -> Result<String, StorageError>;
}
