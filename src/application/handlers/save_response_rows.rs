//! SaveResponseRowsHandler - the legacy batched answer write.
//!
//! Clients that predate the session API post `{user_id, booklet_id,
//! responses, ts}` and get one row per answer.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::{BookletPool, Timestamp, UserId};
use crate::domain::survey::SurveyError;
use crate::ports::{ResponseRow, ResponseRowWriter};

/// Command carrying one submission.
#[derive(Debug, Clone)]
pub struct SaveResponseRowsCommand {
    pub user_id: String,
    pub booklet_id: u32,
    /// Question id to selected label.
    pub responses: BTreeMap<String, String>,
    /// Client submission time in epoch milliseconds; server time when absent.
    pub ts: Option<i64>,
}

/// Handler writing legacy rows.
pub struct SaveResponseRowsHandler {
    writer: Arc<dyn ResponseRowWriter>,
    pool: BookletPool,
}

impl SaveResponseRowsHandler {
    pub fn new(writer: Arc<dyn ResponseRowWriter>, pool: BookletPool) -> Self {
        Self { writer, pool }
    }

    /// Validates the submission and writes its rows.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank user id or a booklet outside the pool
    /// - `Storage` when the sink rejects the batch
    pub async fn handle(&self, cmd: SaveResponseRowsCommand) -> Result<usize, SurveyError> {
        let user_id = UserId::new(cmd.user_id)?;
        let booklet_id = self.pool.booklet(cmd.booklet_id)?;
        let ts = cmd
            .ts
            .unwrap_or_else(|| Timestamp::now().as_unix_millis());

        let rows: Vec<ResponseRow> = cmd
            .responses
            .iter()
            .map(|(question_id, answer)| {
                ResponseRow::new(&user_id, booklet_id, question_id, answer, ts)
            })
            .collect();

        self.writer
            .write_rows(&rows)
            .await
            .map_err(|e| SurveyError::storage(e.to_string()))?;

        tracing::info!(user_id = %user_id, booklet_id = %booklet_id, rows = rows.len(), "Saved response rows");
        Ok(rows.len())
    }
}
