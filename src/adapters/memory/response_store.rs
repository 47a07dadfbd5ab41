//! In-memory ResponseStore for offline runs and tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::survey::{CompletionSummary, IntakeInfo, ResponseBundle};
use crate::ports::{ResponseStore, StorageError};

/// A saved result.
#[derive(Debug, Clone)]
pub struct StoredResult {
    pub id: String,
    pub bundle: ResponseBundle,
    pub intake: IntakeInfo,
    pub summary: CompletionSummary,
}

/// In-memory result store with switchable failure.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResponseStore {
    results: Arc<RwLock<Vec<StoredResult>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Arc::new(RwLock::new(Some(message.into()))),
            ..Self::default()
        }
    }

    pub async fn set_failure(&self, message: Option<String>) {
        *self.failure.write().await = message;
    }

    pub async fn results(&self) -> Vec<StoredResult> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn save(
        &self,
        bundle: &ResponseBundle,
        intake: &IntakeInfo,
        summary: &CompletionSummary,
    ) -> Result<String, StorageError> {
        if let Some(message) = self.failure.read().await.as_ref() {
            return Err(StorageError::unavailable(message.clone()));
        }
        let id = format!("result-{}", uuid::Uuid::new_v4());
        self.results.write().await.push(StoredResult {
            id: id.clone(),
            bundle: bundle.clone(),
            intake: intake.clone(),
            summary: summary.clone(),
        });
        Ok(id)
    }
}
