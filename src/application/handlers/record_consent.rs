//! ConsentRecorder - persists informed consent through the tier chain.
//!
//! Tiers, in order:
//! 1. primary `ConsentStore`
//! 2. local record under `consent_<session>`
//!
//! Participation is never blocked by storage: when both tiers fail the
//! caller still gets a usable record tagged `failed`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::fallback::{ChainOutcome, FallbackChain, StorageTier, TierAttempt};
use crate::domain::consent::{ConsentAck, ConsentDraft, ConsentRecord};
use crate::domain::foundation::ValidationError;
use crate::ports::{ConsentStore, LocalRecordStore, StorageError};

/// Result of recording consent.
#[derive(Debug, Clone)]
pub struct RecordConsentResult {
    pub record: ConsentRecord,
    pub attempts: ChainOutcome,
}

/// Handler for recording consent.
pub struct ConsentRecorder {
    primary: Arc<dyn ConsentStore>,
    chain: FallbackChain<ConsentDraft>,
}

impl ConsentRecorder {
    pub fn new(primary: Arc<dyn ConsentStore>, local: Arc<dyn LocalRecordStore>) -> Self {
        let chain = FallbackChain::new()
            .then(Arc::new(PrimaryConsentTier {
                store: primary.clone(),
            }) as Arc<dyn StorageTier<ConsentDraft>>)
            .then(Arc::new(LocalConsentTier { store: local }));
        Self { primary, chain }
    }

    /// Records consent for a brand new session.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` on `consent_given` when consent was not given
    pub async fn handle(&self, ack: ConsentAck) -> Result<RecordConsentResult, ValidationError> {
        ack.validate()?;
        let draft = ConsentDraft::for_new_session(&ack);
        tracing::info!(session_id = %draft.session_id, "Recording consent");
        Ok(self.save(draft).await)
    }

    /// Saves an existing record again, keeping its session and timestamp.
    pub async fn retry(&self, record: &ConsentRecord) -> RecordConsentResult {
        tracing::info!(
            session_id = %record.session_id,
            previous = %record.save_method,
            "Retrying consent save"
        );
        self.save(record.to_draft()).await
    }

    /// Probes the primary consent store.
    pub async fn check_connection(&self) -> Result<(), StorageError> {
        self.primary.health_check().await
    }

    async fn save(&self, draft: ConsentDraft) -> RecordConsentResult {
        let attempts = self.chain.run(&draft).await;
        let record = match attempts.stored_by() {
            Some((0, attempt)) => {
                ConsentRecord::primary(draft, attempt.storage_id.clone().unwrap_or_default())
            }
            Some(_) => {
                let primary_error = attempts.error_at(0).unwrap_or_default().to_string();
                tracing::warn!(
                    session_id = %draft.session_id,
                    error = %primary_error,
                    "Consent kept locally only"
                );
                ConsentRecord::fallback_local(draft, primary_error)
            }
            None => {
                let primary_error = attempts.error_at(0).unwrap_or_default().to_string();
                let local_error = attempts.error_at(1).unwrap_or_default().to_string();
                tracing::error!(
                    session_id = %draft.session_id,
                    primary_error = %primary_error,
                    local_error = %local_error,
                    "Consent could not be stored"
                );
                ConsentRecord::failed(draft, primary_error, local_error)
            }
        };
        RecordConsentResult { record, attempts }
    }
}

struct PrimaryConsentTier {
    store: Arc<dyn ConsentStore>,
}

#[async_trait]
impl StorageTier<ConsentDraft> for PrimaryConsentTier {
    fn name(&self) -> &'static str {
        "primary"
    }

    async fn store(&self, draft: &ConsentDraft, _: &[TierAttempt]) -> Result<String, StorageError> {
        self.store.save(draft).await
    }
}

struct LocalConsentTier {
    store: Arc<dyn LocalRecordStore>,
}

#[async_trait]
impl StorageTier<ConsentDraft> for LocalConsentTier {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn store(
        &self,
        draft: &ConsentDraft,
        failures: &[TierAttempt],
    ) -> Result<String, StorageError> {
        let primary_error = failures
            .first()
            .and_then(|a| a.error.clone())
            .unwrap_or_default();
        let record = ConsentRecord::fallback_local(draft.clone(), primary_error);
        self.store
            .put(&draft.local_key(), &serde_json::to_value(&record)?)
            .await?;
        Ok(record.storage_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConsentStore;
    use crate::adapters::storage::InMemoryLocalRecordStore;
    use crate::domain::consent::SaveMethod;
    use crate::domain::foundation::Timestamp;
    use serde_json::Value;

    struct BrokenLocalStore;

    #[async_trait]
    impl LocalRecordStore for BrokenLocalStore {
        async fn put(&self, _: &str, _: &Value) -> Result<(), StorageError> {
            Err(StorageError::Io("quota exceeded".to_string()))
        }

        async fn get(&self, _: &str) -> Result<Option<Value>, StorageError> {
            Ok(None)
        }

        async fn keys(&self) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn ack() -> ConsentAck {
        ConsentAck::new(true, Timestamp::now()).with_client_context("Mozilla/5.0")
    }

    #[tokio::test]
    async fn refused_consent_is_rejected() {
        let recorder = ConsentRecorder::new(
            Arc::new(InMemoryConsentStore::new()),
            Arc::new(InMemoryLocalRecordStore::new()),
        );
        let result = recorder.handle(ConsentAck::new(false, Timestamp::now())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn primary_success_uses_store_id() {
        let primary = Arc::new(InMemoryConsentStore::new());
        let local = Arc::new(InMemoryLocalRecordStore::new());
        let recorder = ConsentRecorder::new(primary.clone(), local.clone());

        let result = recorder.handle(ack()).await.unwrap();

        assert_eq!(result.record.save_method, SaveMethod::Primary);
        assert!(result.record.storage_id.starts_with("consent-"));
        assert!(primary.get(&result.record.session_id).await.is_some());
        assert!(local.is_empty().await);
        assert!(!result.record.needs_warning());
    }

    #[tokio::test]
    async fn primary_failure_falls_back_to_local_record() {
        let local = Arc::new(InMemoryLocalRecordStore::new());
        let recorder = ConsentRecorder::new(
            Arc::new(InMemoryConsentStore::failing("permission denied")),
            local.clone(),
        );

        let result = recorder.handle(ack()).await.unwrap();
        let record = &result.record;

        assert_eq!(record.save_method, SaveMethod::FallbackLocal);
        assert_eq!(record.storage_id, format!("local_{}", record.session_id));
        assert!(record.needs_warning());

        let stored = local
            .get(&format!("consent_{}", record.session_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["save_method"], "fallback_local");
        assert_eq!(stored["client_context"], "Mozilla/5.0");
    }

    #[tokio::test]
    async fn both_tiers_failing_still_returns_record() {
        let recorder = ConsentRecorder::new(
            Arc::new(InMemoryConsentStore::failing("permission denied")),
            Arc::new(BrokenLocalStore),
        );

        let result = recorder.handle(ack()).await.unwrap();
        let record = &result.record;

        assert_eq!(record.save_method, SaveMethod::Failed);
        assert_eq!(record.storage_id, format!("error_{}", record.session_id));
        assert!(record.primary_error.as_deref().unwrap().contains("permission denied"));
        assert!(record.local_error.as_deref().unwrap().contains("quota exceeded"));

        let report = record.error_report().unwrap();
        assert!(report.to_pretty_json().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn retry_keeps_session_and_timestamp() {
        let primary = Arc::new(InMemoryConsentStore::failing("offline"));
        let recorder = ConsentRecorder::new(primary.clone(), Arc::new(BrokenLocalStore));

        let first = recorder.handle(ack()).await.unwrap().record;
        assert_eq!(first.save_method, SaveMethod::Failed);

        primary.set_failure(None).await;
        let second = recorder.retry(&first).await.record;

        assert_eq!(second.save_method, SaveMethod::Primary);
        assert_eq!(second.session_id, first.session_id);
        assert_eq!(second.consent_timestamp, first.consent_timestamp);
    }

    #[tokio::test]
    async fn check_connection_reports_primary_health() {
        let primary = Arc::new(InMemoryConsentStore::failing("offline"));
        let recorder =
            ConsentRecorder::new(primary.clone(), Arc::new(InMemoryLocalRecordStore::new()));

        assert!(recorder.check_connection().await.is_err());
        primary.set_failure(None).await;
        assert!(recorder.check_connection().await.is_ok());
    }
}
