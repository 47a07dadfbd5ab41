//! File-based Local Record Store
//!
//! Stores fallback records as pretty-printed JSON files, one file per key,
//! under a single directory.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{LocalRecordStore, StorageError};

/// File-based storage for fallback records
#[derive(Debug, Clone)]
pub struct FileLocalRecordStore {
    base_path: PathBuf,
}

impl FileLocalRecordStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileLocalRecordStore::new("./data/fallback");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File path for a key; characters outside `[A-Za-z0-9_-]` become `_`
    fn record_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", safe))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[async_trait]
impl LocalRecordStore for FileLocalRecordStore {
    async fn put(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.record_path(key), json)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(key, path = %self.base_path.display(), "Stored local fallback record");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
