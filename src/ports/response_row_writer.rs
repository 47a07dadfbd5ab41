//! Legacy per-question row sink.
//!
//! The original response endpoint stored one key/value row per answer,
//! partitioned by user. This port keeps that schema alive as a secondary
//! sink next to the primary result store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookletId, UserId};

use super::StorageError;

/// One answer row: partition `user#<id>`, sort key `q#<question>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRow {
    pub pk: String,
    pub sk: String,
    pub booklet_id: u32,
    pub answer: String,
    /// Submission time, epoch milliseconds.
    pub ts: i64,
}

impl ResponseRow {
    pub fn new(
        user_id: &UserId,
        booklet_id: BookletId,
        question_id: &str,
        answer: impl Into<String>,
        ts: i64,
    ) -> Self {
        Self {
            pk: format!("user#{}", user_id),
            sk: format!("q#{}", question_id),
            booklet_id: booklet_id.value(),
            answer: answer.into(),
            ts,
        }
    }
}

/// Batched writer for [`ResponseRow`]s.
#[async_trait]
pub trait ResponseRowWriter: Send + Sync {
    /// Write every row; an existing `(pk, sk)` is overwritten.
    async fn write_rows(&self, rows: &[ResponseRow]) -> Result<(), StorageError>;
}
