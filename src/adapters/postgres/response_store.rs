//! PostgreSQL implementation of ResponseStore.
//!
//! Stores the bundle, intake answers and summary as JSONB, with accuracy and
//! timing duplicated into plain columns for querying.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::survey::{CompletionSummary, IntakeInfo, ResponseBundle};
use crate::ports::{ResponseStore, StorageError};

/// PostgreSQL implementation of ResponseStore.
#[derive(Clone)]
pub struct PostgresResponseStore {
    pool: PgPool,
}

impl PostgresResponseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponseStore for PostgresResponseStore {
    async fn save(
        &self,
        bundle: &ResponseBundle,
        intake: &IntakeInfo,
        summary: &CompletionSummary,
    ) -> Result<String, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO survey_results (
                session_id, booklet_id, bundle, intake, summary, accuracy, total_time_ms,
                completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(bundle.session_id().as_uuid())
        .bind(bundle.booklet_id().value() as i32)
        .bind(Json(bundle))
        .bind(Json(intake))
        .bind(Json(summary))
        .bind(summary.accuracy_percent)
        .bind(bundle.total_time_ms() as i64)
        .bind(bundle.completed_at().as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::database(format!("Failed to insert survey result: {}", e)))?;

        let id: Uuid = row
            .try_get("id")
            .map_err(|e| StorageError::database(format!("Invalid survey result id: {}", e)))?;

        Ok(id.to_string())
    }
}

impl std::fmt::Debug for PostgresResponseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresResponseStore").finish_non_exhaustive()
    }
}
