//! In-memory ResponseRowWriter for offline runs and tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{ResponseRow, ResponseRowWriter, StorageError};

/// Rows keyed by `(pk, sk)`, overwritten on conflict.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResponseRowWriter {
    rows: Arc<RwLock<BTreeMap<(String, String), ResponseRow>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryResponseRowWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Arc::new(RwLock::new(Some(message.into()))),
            ..Self::default()
        }
    }

    pub async fn rows(&self) -> Vec<ResponseRow> {
        self.rows.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ResponseRowWriter for InMemoryResponseRowWriter {
    async fn write_rows(&self, rows: &[ResponseRow]) -> Result<(), StorageError> {
        if let Some(message) = self.failure.read().await.as_ref() {
            return Err(StorageError::unavailable(message.clone()));
        }
        let mut stored = self.rows.write().await;
        for row in rows {
            stored.insert((row.pk.clone(), row.sk.clone()), row.clone());
        }
        Ok(())
    }
}
