//! Local fallback record port.
//!
//! Last storage tier: records that could not reach a durable store are
//! kept here under `consent_<session>` or `survey_<session>` keys.

use async_trait::async_trait;
use serde_json::Value;

use super::StorageError;

/// Key/value store for fallback records, never transmitted anywhere.
#[async_trait]
pub trait LocalRecordStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// All stored keys, sorted.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}
