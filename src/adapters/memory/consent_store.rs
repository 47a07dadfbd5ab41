//! In-memory ConsentStore for offline runs and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::consent::ConsentDraft;
use crate::domain::foundation::SessionId;
use crate::ports::{ConsentStore, StorageError};

/// In-memory consent store with switchable failure.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConsentStore {
    records: Arc<RwLock<HashMap<SessionId, (String, ConsentDraft)>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Arc::new(RwLock::new(Some(message.into()))),
            ..Self::default()
        }
    }

    /// Start or stop failing calls.
    pub async fn set_failure(&self, message: Option<String>) {
        *self.failure.write().await = message;
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<ConsentDraft> {
        self.records
            .read()
            .await
            .get(session_id)
            .map(|(_, draft)| draft.clone())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    async fn check_failure(&self) -> Result<(), StorageError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(StorageError::unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConsentStore for InMemoryConsentStore {
    async fn save(&self, draft: &ConsentDraft) -> Result<String, StorageError> {
        self.check_failure().await?;
        let mut records = self.records.write().await;
        let (id, _) = records
            .entry(draft.session_id)
            .or_insert_with(|| (format!("consent-{}", uuid::Uuid::new_v4()), draft.clone()));
        Ok(id.clone())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.check_failure().await
    }
}
