//! PersistencePipeline - stores a finished session's responses.
//!
//! The summary is computed first. Then, concurrently:
//! - the tier chain writes bundle + intake + summary to the primary `ResponseStore`,
//!   falling back to a local `survey_<session>` record tagged
//!   `error: "primary save failed"`
//! - the legacy row writer stores one row per answer
//!
//! Nothing here returns an error: every failure is logged and reported in
//! the outcome.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::fallback::{ChainOutcome, FallbackChain, StorageTier, TierAttempt};
use crate::domain::booklet::Booklet;
use crate::domain::consent::SaveMethod;
use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::survey::{CompletionSummary, IntakeInfo, ResponseBundle};
use crate::ports::{LocalRecordStore, ResponseRow, ResponseRowWriter, ResponseStore, StorageError};

/// Tag written into local records when the primary store rejected them.
pub const PRIMARY_SAVE_FAILED: &str = "primary save failed";

/// What the chain stores: the bundle with the participant's intake answers
/// and the summary.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyResultRecord {
    pub bundle: ResponseBundle,
    pub intake: IntakeInfo,
    pub summary: CompletionSummary,
}

/// Result of the legacy row write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SecondaryWrite {
    Written { rows: usize },
    Failed { error: String },
    Skipped,
}

/// Everything persistence did for one bundle.
#[derive(Debug, Clone, Serialize)]
pub struct PersistOutcome {
    pub session_id: SessionId,
    pub save_method: SaveMethod,
    pub storage_id: String,
    pub summary: CompletionSummary,
    pub attempts: ChainOutcome,
    pub secondary: SecondaryWrite,
}

/// Handler that persists completed surveys.
pub struct PersistencePipeline {
    chain: FallbackChain<SurveyResultRecord>,
    rows: Option<Arc<dyn ResponseRowWriter>>,
}

impl PersistencePipeline {
    pub fn new(primary: Arc<dyn ResponseStore>, local: Arc<dyn LocalRecordStore>) -> Self {
        let chain = FallbackChain::new()
            .then(
                Arc::new(PrimaryResultTier { store: primary })
                    as Arc<dyn StorageTier<SurveyResultRecord>>,
            )
            .then(Arc::new(LocalResultTier { store: local }));
        Self { chain, rows: None }
    }

    /// Also write legacy per-question rows.
    pub fn with_row_writer(mut self, rows: Arc<dyn ResponseRowWriter>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub async fn handle(
        &self,
        bundle: &ResponseBundle,
        booklet: &Booklet,
        intake: &IntakeInfo,
    ) -> PersistOutcome {
        let session_id = bundle.session_id();
        let summary = CompletionSummary::compute(bundle, booklet);
        tracing::info!(
            session_id = %session_id,
            booklet_id = %bundle.booklet_id(),
            answered = summary.answered_count,
            accuracy = summary.accuracy_percent,
            "Persisting survey results"
        );

        let record = SurveyResultRecord {
            bundle: bundle.clone(),
            intake: intake.clone(),
            summary: summary.clone(),
        };

        let (attempts, secondary) = tokio::join!(self.chain.run(&record), self.write_rows(bundle));

        let (save_method, storage_id) = match attempts.stored_by() {
            Some((0, attempt)) => {
                let id = attempt.storage_id.clone().unwrap_or_default();
                tracing::info!(session_id = %session_id, storage_id = %id, "Survey results saved");
                (SaveMethod::Primary, id)
            }
            Some((_, attempt)) => (
                SaveMethod::FallbackLocal,
                attempt.storage_id.clone().unwrap_or_default(),
            ),
            None => {
                tracing::error!(session_id = %session_id, "Survey results could not be stored anywhere");
                (SaveMethod::Failed, format!("error_{}", session_id))
            }
        };

        PersistOutcome {
            session_id,
            save_method,
            storage_id,
            summary,
            attempts,
            secondary,
        }
    }

    async fn write_rows(&self, bundle: &ResponseBundle) -> SecondaryWrite {
        let Some(writer) = &self.rows else {
            return SecondaryWrite::Skipped;
        };

        let user_id = UserId::from(bundle.session_id());
        let ts = bundle.completed_at().as_unix_millis();
        let rows: Vec<ResponseRow> = bundle
            .responses()
            .iter()
            .map(|(position, label)| {
                ResponseRow::new(&user_id, bundle.booklet_id(), &position.to_string(), label, ts)
            })
            .collect();

        match writer.write_rows(&rows).await {
            Ok(()) => SecondaryWrite::Written { rows: rows.len() },
            Err(e) => {
                tracing::warn!(session_id = %bundle.session_id(), error = %e, "Legacy row write failed");
                SecondaryWrite::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

struct PrimaryResultTier {
    store: Arc<dyn ResponseStore>,
}

#[async_trait]
impl StorageTier<SurveyResultRecord> for PrimaryResultTier {
    fn name(&self) -> &'static str {
        "primary"
    }

    async fn store(
        &self,
        record: &SurveyResultRecord,
        _: &[TierAttempt],
    ) -> Result<String, StorageError> {
        self.store
            .save(&record.bundle, &record.intake, &record.summary)
            .await
    }
}

struct LocalResultTier {
    store: Arc<dyn LocalRecordStore>,
}

#[async_trait]
impl StorageTier<SurveyResultRecord> for LocalResultTier {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn store(
        &self,
        record: &SurveyResultRecord,
        failures: &[TierAttempt],
    ) -> Result<String, StorageError> {
        let session_id = record.bundle.session_id();
        let detail: Vec<&str> = failures.iter().filter_map(|a| a.error.as_deref()).collect();

        let value = serde_json::json!({
            "bundle": record.bundle,
            "intake": record.intake,
            "summary": record.summary,
            "error": PRIMARY_SAVE_FAILED,
            "error_detail": detail.join("; "),
            "saved_at": Timestamp::now(),
        });

        self.store
            .put(&format!("survey_{}", session_id), &value)
            .await?;
        Ok(format!("local_{}", session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryResponseRowWriter, InMemoryResponseStore};
    use crate::adapters::storage::InMemoryLocalRecordStore;
    use crate::domain::booklet::Question;
    use crate::domain::foundation::BookletId;
    use serde_json::Value;
    use std::collections::BTreeMap;

    struct BrokenLocalStore;

    #[async_trait]
    impl LocalRecordStore for BrokenLocalStore {
        async fn put(&self, _: &str, _: &Value) -> Result<(), StorageError> {
            Err(StorageError::Io("disk full".to_string()))
        }

        async fn get(&self, _: &str) -> Result<Option<Value>, StorageError> {
            Ok(None)
        }

        async fn keys(&self) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn booklet() -> Booklet {
        let questions: Vec<Question> = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                serde_json::from_value(serde_json::json!({
                    "position": i as u32,
                    "question": "Which shape?",
                    "options": "A, B, C, D",
                    "answer": answer,
                }))
                .unwrap()
            })
            .collect();
        Booklet::new(BookletId::new(5, 19).unwrap(), questions).unwrap()
    }

    fn intake() -> IntakeInfo {
        IntakeInfo::new(Some("26-35"), Some("female")).unwrap()
    }

    fn bundle() -> ResponseBundle {
        ResponseBundle::new(
            SessionId::new(),
            BookletId::new(5, 19).unwrap(),
            BTreeMap::from([(0, "A".into()), (1, "X".into()), (2, "C".into())]),
            BTreeMap::from([(0, 900), (1, 1_100), (2, 1_000)]),
            3_000,
            Timestamp::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn primary_success_saves_bundle_and_summary() {
        let primary = Arc::new(InMemoryResponseStore::new());
        let local = Arc::new(InMemoryLocalRecordStore::new());
        let pipeline = PersistencePipeline::new(primary.clone(), local.clone());

        let outcome = pipeline.handle(&bundle(), &booklet(), &intake()).await;

        assert_eq!(outcome.save_method, SaveMethod::Primary);
        assert_eq!(outcome.summary.correct_answers, 2);
        assert_eq!(outcome.secondary, SecondaryWrite::Skipped);
        let saved = primary.results().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, outcome.storage_id);
        assert_eq!(saved[0].intake, intake());
        assert!(local.is_empty().await);
    }

    #[tokio::test]
    async fn primary_failure_writes_tagged_local_record() {
        let local = Arc::new(InMemoryLocalRecordStore::new());
        let pipeline = PersistencePipeline::new(
            Arc::new(InMemoryResponseStore::failing("timeout")),
            local.clone(),
        );
        let bundle = bundle();

        let outcome = pipeline.handle(&bundle, &booklet(), &intake()).await;

        assert_eq!(outcome.save_method, SaveMethod::FallbackLocal);
        assert_eq!(outcome.storage_id, format!("local_{}", bundle.session_id()));

        let stored = local
            .get(&format!("survey_{}", bundle.session_id()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["error"], PRIMARY_SAVE_FAILED);
        assert!(stored["error_detail"].as_str().unwrap().contains("timeout"));
        assert_eq!(stored["bundle"]["responses"]["1"], "X");
        assert_eq!(stored["intake"]["age"], "26-35");
        assert_eq!(stored["intake"]["gender"], "female");
    }

    #[tokio::test]
    async fn every_tier_failing_is_swallowed() {
        let pipeline = PersistencePipeline::new(
            Arc::new(InMemoryResponseStore::failing("timeout")),
            Arc::new(BrokenLocalStore),
        );
        let outcome = pipeline.handle(&bundle(), &booklet(), &intake()).await;
        assert_eq!(outcome.save_method, SaveMethod::Failed);
        assert_eq!(outcome.attempts.attempts.len(), 2);
    }

    #[tokio::test]
    async fn secondary_write_runs_even_when_primary_fails() {
        let rows = Arc::new(InMemoryResponseRowWriter::new());
        let pipeline = PersistencePipeline::new(
            Arc::new(InMemoryResponseStore::failing("timeout")),
            Arc::new(InMemoryLocalRecordStore::new()),
        )
        .with_row_writer(rows.clone());
        let bundle = bundle();

        let outcome = pipeline.handle(&bundle, &booklet(), &intake()).await;

        assert_eq!(outcome.secondary, SecondaryWrite::Written { rows: 3 });
        let stored = rows.rows().await;
        assert_eq!(stored.len(), 3);
        assert!(stored
            .iter()
            .all(|r| r.pk == format!("user#{}", bundle.session_id())));
    }

    #[tokio::test]
    async fn secondary_failure_does_not_change_save_method() {
        let pipeline = PersistencePipeline::new(
            Arc::new(InMemoryResponseStore::new()),
            Arc::new(InMemoryLocalRecordStore::new()),
        )
        .with_row_writer(Arc::new(InMemoryResponseRowWriter::failing("throttled")));

        let outcome = pipeline.handle(&bundle(), &booklet(), &intake()).await;

        assert_eq!(outcome.save_method, SaveMethod::Primary);
        assert!(matches!(outcome.secondary, SecondaryWrite::Failed { .. }));
    }
}
