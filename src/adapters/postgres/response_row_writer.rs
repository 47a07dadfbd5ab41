//! PostgreSQL implementation of ResponseRowWriter.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::ports::{ResponseRow, ResponseRowWriter, StorageError};

/// Writes legacy answer rows, upserting on `(pk, sk)`.
#[derive(Clone)]
pub struct PostgresResponseRowWriter {
    pool: PgPool,
}

impl PostgresResponseRowWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponseRowWriter for PostgresResponseRowWriter {
    async fn write_rows(&self, rows: &[ResponseRow]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::database(format!("Failed to begin transaction: {}", e)))?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO survey_response_rows (pk, sk, booklet_id, answer, ts)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (pk, sk) DO UPDATE SET
                    booklet_id = EXCLUDED.booklet_id,
                    answer = EXCLUDED.answer,
                    ts = EXCLUDED.ts
                "#,
            )
            .bind(&row.pk)
            .bind(&row.sk)
            .bind(row.booklet_id as i32)
            .bind(&row.answer)
            .bind(row.ts)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::database(format!("Failed to write response row: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::database(format!("Failed to commit response rows: {}", e)))?;

        Ok(())
    }
}

impl std::fmt::Debug for PostgresResponseRowWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresResponseRowWriter").finish_non_exhaustive()
    }
}
