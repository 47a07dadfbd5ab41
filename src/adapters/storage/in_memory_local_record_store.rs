//! In-Memory Local Record Store
//!
//! Keeps fallback records in process memory. Used offline and in tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{LocalRecordStore, StorageError};

/// In-memory storage for fallback records
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocalRecordStore {
    records: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl InMemoryLocalRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Clear all records (useful for tests)
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl LocalRecordStore for InMemoryLocalRecordStore {
    async fn put(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }
}
