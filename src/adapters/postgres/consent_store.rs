//! PostgreSQL implementation of ConsentStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::consent::ConsentDraft;
use crate::ports::{ConsentStore, StorageError};

/// PostgreSQL implementation of ConsentStore.
///
/// One row per session; saving a session again returns the existing row id.
#[derive(Clone)]
pub struct PostgresConsentStore {
    pool: PgPool,
}

impl PostgresConsentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsentStore for PostgresConsentStore {
    async fn save(&self, draft: &ConsentDraft) -> Result<String, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO consent_records (
                session_id, consent_given, consent_timestamp, client_context
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                consent_given = EXCLUDED.consent_given
            RETURNING id
            "#,
        )
        .bind(draft.session_id.as_uuid())
        .bind(draft.consent_given)
        .bind(draft.consent_timestamp.as_datetime())
        .bind(&draft.client_context)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::database(format!("Failed to insert consent record: {}", e)))?;

        let id: Uuid = row
            .try_get("id")
            .map_err(|e| StorageError::database(format!("Invalid consent record id: {}", e)))?;

        Ok(id.to_string())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("Database unreachable: {}", e)))?;
        Ok(())
    }
}

impl std::fmt::Debug for PostgresConsentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConsentStore").finish_non_exhaustive()
    }
}
