//! Storage error shared by every persistence port.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Failure of a single storage tier.
///
/// Callers treat every variant the same way (degrade to the next tier);
/// the variants exist so logs and error reports say what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StorageError::Unavailable(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        StorageError::Database(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StorageError::Cache(_) => ErrorCode::CacheError,
            StorageError::Serialization(_) => ErrorCode::InternalError,
            _ => ErrorCode::DatabaseError,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
