//! SurveyFlow - drives one participant's session end to end.
//!
//! The flow owns a [`SurveySession`] and composes the consent recorder,
//! booklet assigner, booklet source and persistence pipeline around it.
//!
//! Ordering:
//! - consent completes (through whichever tier) before intake
//! - booklet assignment and load complete before the first question
//! - persistence starts exactly once, after the final advance, in a
//!   background task; the session is already `Completed` by then

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::booklet::{Question, QuestionPosition};
use crate::domain::consent::{ConsentAck, ConsentErrorReport, ConsentRecord};
use crate::domain::foundation::{BookletId, ErrorCode, Timestamp};
use crate::domain::survey::{
    format_elapsed, Advance, IntakeInfo, SurveyError, SurveyPhase, SurveySession,
};
use crate::ports::BookletSource;

use super::assign_booklet::BookletAssigner;
use super::persist_responses::{PersistOutcome, PersistencePipeline};
use super::record_consent::ConsentRecorder;

/// Services shared by every flow.
#[derive(Clone)]
pub struct SurveyServices {
    pub consent: Arc<ConsentRecorder>,
    pub assigner: Arc<BookletAssigner>,
    pub booklets: Arc<dyn BookletSource>,
    pub persistence: Arc<PersistencePipeline>,
}

/// Navigation state exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub current_index: usize,
    pub current_position: QuestionPosition,
    pub total: usize,
    pub answered_count: usize,
    pub answered_positions: Vec<QuestionPosition>,
    pub progress_percent: f64,
    pub is_last: bool,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub elapsed_ms: u64,
    /// `m:ss`
    pub elapsed: String,
}

/// What a forward step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlowStep {
    Moved { index: usize },
    Completed,
}

/// Application-level controller for one survey session.
pub struct SurveyFlow {
    services: SurveyServices,
    session: SurveySession,
    assigned_booklet: Option<BookletId>,
    persistence: Option<JoinHandle<PersistOutcome>>,
    outcome: Option<PersistOutcome>,
}

impl SurveyFlow {
    pub fn new(services: SurveyServices) -> Self {
        Self {
            services,
            session: SurveySession::new(),
            assigned_booklet: None,
            persistence: None,
            outcome: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn session(&self) -> &SurveySession {
        &self.session
    }

    pub fn phase(&self) -> SurveyPhase {
        self.session.phase()
    }

    /// Booklet drawn for this session, even if its content failed to load.
    pub fn assigned_booklet(&self) -> Option<BookletId> {
        self.assigned_booklet
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn progress(&self) -> Option<Progress> {
        let navigator = self.session.navigator()?;
        if navigator.is_finished() {
            return None;
        }
        let elapsed_ms = navigator.elapsed_ms(Timestamp::now());
        Some(Progress {
            current_index: navigator.current_index(),
            current_position: navigator.current_position(),
            total: navigator.total(),
            answered_count: navigator.answered_count(),
            answered_positions: navigator.answered_positions(),
            progress_percent: navigator.progress_percent(),
            is_last: navigator.is_last(),
            can_advance: navigator.can_advance(),
            can_retreat: navigator.can_retreat(),
            elapsed_ms,
            elapsed: format_elapsed(elapsed_ms),
        })
    }

    /// Persistence result, once the background task has been joined.
    pub fn persistence_outcome(&self) -> Option<&PersistOutcome> {
        self.outcome.as_ref()
    }

    pub fn consent_report(&self) -> Option<ConsentErrorReport> {
        self.session.consent()?.error_report()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consent
    // ─────────────────────────────────────────────────────────────────────────

    /// Records consent and moves to intake, whichever tier stored it.
    ///
    /// # Errors
    ///
    /// - `Validation` when consent was not given (phase unchanged)
    /// - `InvalidState` when consent was already recorded
    pub async fn give_consent(&mut self, ack: ConsentAck) -> Result<&ConsentRecord, SurveyError> {
        if self.session.phase() != SurveyPhase::Consent {
            return Err(SurveyError::invalid_state("consent already recorded"));
        }

        let result = self.services.consent.handle(ack).await?;
        let record = result.record;
        let warning = record.needs_warning().then(|| {
            format!(
                "Consent saved with method {} ({})",
                record.save_method, record.storage_id
            )
        });

        self.session.accept_consent(record)?;
        if let Some(message) = warning {
            self.session
                .annotate(ErrorCode::DatabaseError, message, Timestamp::now());
        }

        self.session
            .consent()
            .ok_or_else(|| SurveyError::invalid_state("consent missing after acceptance"))
    }

    /// Re-runs the consent tier chain without asking for consent again.
    pub async fn retry_consent_save(&mut self) -> Result<&ConsentRecord, SurveyError> {
        let current = self
            .session
            .consent()
            .cloned()
            .ok_or_else(|| SurveyError::invalid_state("no consent recorded"))?;

        let result = self.services.consent.retry(&current).await;
        self.session.replace_consent_save(result.record)?;

        self.session
            .consent()
            .ok_or_else(|| SurveyError::invalid_state("consent missing after retry"))
    }

    /// Probes the primary consent store.
    pub async fn check_primary_connection(&self) -> Result<(), SurveyError> {
        self.services
            .consent
            .check_connection()
            .await
            .map_err(|e| SurveyError::storage(e.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Intake
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates intake, assigns and loads a booklet, and shows question one.
    ///
    /// A failed load leaves the session in intake with an annotation; calling
    /// again retries with the same booklet.
    pub async fn start_survey(
        &mut self,
        age: Option<&str>,
        gender: Option<&str>,
    ) -> Result<BookletId, SurveyError> {
        if self.session.phase() != SurveyPhase::Intake {
            return Err(SurveyError::invalid_state(format!(
                "intake is not open (phase is {})",
                self.session.phase()
            )));
        }

        let intake = IntakeInfo::new(age, gender)?;

        let booklet_id = match self.assigned_booklet {
            Some(id) => id,
            None => {
                let id = self.services.assigner.handle().booklet_id;
                self.assigned_booklet = Some(id);
                id
            }
        };

        let booklet = match self.services.booklets.load(booklet_id).await {
            Ok(booklet) => booklet,
            Err(e) => {
                tracing::error!(booklet_id = %booklet_id, error = %e, "Failed to load booklet");
                self.session
                    .annotate(ErrorCode::ContentLoadFailed, e.to_string(), Timestamp::now());
                return Err(SurveyError::content_load(e.to_string()));
            }
        };

        self.session.begin_survey(intake, booklet, Timestamp::now())?;
        tracing::info!(
            session_id = ?self.session.session_id(),
            booklet_id = %booklet_id,
            "Survey started"
        );
        Ok(booklet_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn select_answer(
        &mut self,
        position: QuestionPosition,
        label: impl Into<String>,
    ) -> Result<(), SurveyError> {
        self.session.select_answer(position, label, Timestamp::now())
    }

    /// Moves forward; the final advance completes the session and starts
    /// persistence in the background.
    pub fn advance(&mut self) -> Result<FlowStep, SurveyError> {
        match self.session.advance(Timestamp::now())? {
            Advance::Moved { index } => Ok(FlowStep::Moved { index }),
            Advance::Finished(bundle) => {
                let booklet = self
                    .session
                    .booklet()
                    .cloned()
                    .ok_or_else(|| SurveyError::invalid_state("completed without a booklet"))?;
                let intake = self
                    .session
                    .intake()
                    .cloned()
                    .ok_or_else(|| SurveyError::invalid_state("completed without intake"))?;
                let pipeline = self.services.persistence.clone();
                tracing::info!(session_id = %bundle.session_id(), "Survey completed");
                self.persistence = Some(tokio::spawn(async move {
                    pipeline.handle(&bundle, &booklet, &intake).await
                }));
                Ok(FlowStep::Completed)
            }
        }
    }

    pub fn retreat(&mut self) -> Result<usize, SurveyError> {
        self.session.retreat(Timestamp::now())
    }

    pub fn jump_to(&mut self, index: usize) -> Result<usize, SurveyError> {
        self.session.jump_to(index, Timestamp::now())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completion
    // ─────────────────────────────────────────────────────────────────────────

    /// True while the background save has not been joined yet.
    pub fn is_saving(&self) -> bool {
        self.persistence.is_some()
    }

    /// Collects the persistence result if the background task has already
    /// finished. Never waits on storage.
    pub async fn poll_persistence(&mut self) -> Option<&PersistOutcome> {
        if self
            .persistence
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
        {
            self.join_persistence().await;
        }
        self.outcome.as_ref()
    }

    /// Waits for background persistence, if it was started.
    ///
    /// The task handle is only released once joined, so dropping this
    /// future leaves the outcome collectable later.
    pub async fn await_persistence(&mut self) -> Option<&PersistOutcome> {
        self.join_persistence().await;
        self.outcome.as_ref()
    }

    async fn join_persistence(&mut self) {
        let Some(handle) = self.persistence.as_mut() else {
            return;
        };
        let joined = handle.await;
        self.persistence = None;

        match joined {
            Ok(outcome) => {
                if !outcome.save_method.is_saved() {
                    self.session.annotate(
                        ErrorCode::DatabaseError,
                        "survey results could not be stored",
                        Timestamp::now(),
                    );
                }
                self.outcome = Some(outcome);
            }
            Err(e) => {
                tracing::error!(error = %e, "Persistence task failed");
                self.session.annotate(
                    ErrorCode::InternalError,
                    format!("persistence task failed: {}", e),
                    Timestamp::now(),
                );
            }
        }
    }

    /// Discards the session and starts over at consent.
    ///
    /// Background persistence of the old session keeps running.
    pub fn reset(&mut self) {
        tracing::info!(session_id = ?self.session.session_id(), "Resetting survey session");
        self.session = SurveySession::new();
        self.assigned_booklet = None;
        self.persistence = None;
        self.outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::booklets::InMemoryBookletSource;
    use crate::adapters::memory::{InMemoryConsentStore, InMemoryResponseStore};
    use crate::adapters::storage::InMemoryLocalRecordStore;
    use crate::domain::booklet::Booklet;
    use crate::domain::consent::SaveMethod;
    use crate::domain::foundation::BookletPool;
    use crate::domain::survey::{CompletionSummary, ResponseBundle};
    use crate::ports::{LocalRecordStore, ResponseStore, StorageError};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Primary store whose writes never return.
    struct StalledResponseStore;

    #[async_trait]
    impl ResponseStore for StalledResponseStore {
        async fn save(
            &self,
            _: &ResponseBundle,
            _: &IntakeInfo,
            _: &CompletionSummary,
        ) -> Result<String, StorageError> {
            std::future::pending().await
        }
    }

    struct Harness {
        flow: SurveyFlow,
        consent_store: Arc<InMemoryConsentStore>,
        results: Arc<InMemoryResponseStore>,
        local: Arc<InMemoryLocalRecordStore>,
    }

    async fn harness(pool_size: u32, load_booklets: bool) -> Harness {
        let results = Arc::new(InMemoryResponseStore::new());
        harness_with_primary(pool_size, load_booklets, results.clone(), results).await
    }

    async fn harness_with_primary(
        pool_size: u32,
        load_booklets: bool,
        primary: Arc<dyn ResponseStore>,
        results: Arc<InMemoryResponseStore>,
    ) -> Harness {
        let consent_store = Arc::new(InMemoryConsentStore::new());
        let local = Arc::new(InMemoryLocalRecordStore::new());
        let booklets = Arc::new(InMemoryBookletSource::new());

        if load_booklets {
            for id in 0..pool_size {
                let questions: Vec<Question> = (1..=3)
                    .map(|p| {
                        serde_json::from_value(serde_json::json!({
                            "position": p,
                            "question": format!("Q{}", p),
                            "options": "A, B, C, D",
                            "answer": "B",
                        }))
                        .unwrap()
                    })
                    .collect();
                booklets
                    .insert(Booklet::new(BookletId::new(id, pool_size).unwrap(), questions).unwrap())
                    .await;
            }
        }

        let services = SurveyServices {
            consent: Arc::new(ConsentRecorder::new(consent_store.clone(), local.clone())),
            assigner: Arc::new(BookletAssigner::new(BookletPool::new(pool_size).unwrap())),
            booklets,
            persistence: Arc::new(PersistencePipeline::new(primary, local.clone())),
        };

        Harness {
            flow: SurveyFlow::new(services),
            consent_store,
            results,
            local,
        }
    }

    fn ack() -> ConsentAck {
        ConsentAck::new(true, Timestamp::now())
    }

    #[tokio::test]
    async fn full_session_completes_and_persists() {
        let mut h = harness(19, true).await;

        h.flow.give_consent(ack()).await.unwrap();
        let booklet_id = h.flow.start_survey(Some("26-35"), Some("female")).await.unwrap();
        assert!(booklet_id.value() < 19);

        for p in 1..=3 {
            h.flow.select_answer(p, "B").unwrap();
            h.flow.advance().unwrap();
        }
        assert_eq!(h.flow.phase(), SurveyPhase::Completed);

        let outcome = h.flow.await_persistence().await.unwrap();
        assert_eq!(outcome.save_method, SaveMethod::Primary);
        assert_eq!(outcome.summary.accuracy_percent, 100.0);
        let stored = h.results.results().await;
        assert_eq!(stored[0].bundle.booklet_id(), booklet_id);
        assert_eq!(stored[0].intake.age(), "26-35");
        assert_eq!(stored[0].intake.gender(), "female");
    }

    #[tokio::test]
    async fn stalled_primary_does_not_hold_back_completion() {
        let mut h = harness_with_primary(
            19,
            true,
            Arc::new(StalledResponseStore),
            Arc::new(InMemoryResponseStore::new()),
        )
        .await;
        h.flow.give_consent(ack()).await.unwrap();
        h.flow.start_survey(Some("26-35"), Some("female")).await.unwrap();
        h.flow.jump_to(2).unwrap();

        assert_eq!(h.flow.advance().unwrap(), FlowStep::Completed);
        assert_eq!(h.flow.phase(), SurveyPhase::Completed);

        assert!(h.flow.poll_persistence().await.is_none());
        assert!(h.flow.is_saving());

        // An abandoned wait keeps the task so a later poll can still join it.
        let waited =
            tokio::time::timeout(Duration::from_millis(50), h.flow.await_persistence()).await;
        assert!(waited.is_err());
        assert!(h.flow.is_saving());
    }

    #[tokio::test]
    async fn poll_collects_finished_persistence() {
        let mut h = harness(19, true).await;
        h.flow.give_consent(ack()).await.unwrap();
        h.flow.start_survey(Some("18-25"), Some("male")).await.unwrap();
        h.flow.jump_to(2).unwrap();
        h.flow.advance().unwrap();

        let mut collected = None;
        for _ in 0..100 {
            if let Some(outcome) = h.flow.poll_persistence().await {
                collected = Some(outcome.save_method);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(collected, Some(SaveMethod::Primary));
        assert!(!h.flow.is_saving());
    }

    #[tokio::test]
    async fn refused_consent_stays_in_consent_phase() {
        let mut h = harness(19, true).await;
        let err = h
            .flow
            .give_consent(ConsentAck::new(false, Timestamp::now()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConsentRequired);
        assert_eq!(h.flow.phase(), SurveyPhase::Consent);
    }

    #[tokio::test]
    async fn local_consent_still_opens_intake_with_warning() {
        let mut h = harness(19, true).await;
        h.consent_store.set_failure(Some("offline".into())).await;

        let record = h.flow.give_consent(ack()).await.unwrap().clone();

        assert_eq!(record.save_method, SaveMethod::FallbackLocal);
        assert_eq!(h.flow.phase(), SurveyPhase::Intake);
        assert!(h.flow.session().last_annotation().is_some());
        assert!(h.flow.consent_report().is_some());
    }

    #[tokio::test]
    async fn retry_moves_consent_to_primary() {
        let mut h = harness(19, true).await;
        h.consent_store.set_failure(Some("offline".into())).await;
        let first = h.flow.give_consent(ack()).await.unwrap().clone();

        h.consent_store.set_failure(None).await;
        assert!(h.flow.check_primary_connection().await.is_ok());
        let retried = h.flow.retry_consent_save().await.unwrap();

        assert_eq!(retried.save_method, SaveMethod::Primary);
        assert_eq!(retried.session_id, first.session_id);
    }

    #[tokio::test]
    async fn missing_intake_field_blocks_start() {
        let mut h = harness(19, true).await;
        h.flow.give_consent(ack()).await.unwrap();

        let err = h.flow.start_survey(Some("26-35"), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(h.flow.phase(), SurveyPhase::Intake);
        assert!(h.flow.assigned_booklet().is_none());
    }

    #[tokio::test]
    async fn content_failure_keeps_intake_and_retries_same_booklet() {
        let mut h = harness(1, false).await;
        h.flow.give_consent(ack()).await.unwrap();

        let err = h.flow.start_survey(Some("18-25"), Some("male")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ContentLoadFailed);
        assert_eq!(h.flow.phase(), SurveyPhase::Intake);
        assert_eq!(
            h.flow.session().last_annotation().unwrap().code,
            "CONTENT_LOAD_FAILED"
        );
        let first = h.flow.assigned_booklet();

        assert!(h.flow.start_survey(Some("18-25"), Some("male")).await.is_err());
        assert_eq!(h.flow.assigned_booklet(), first);
    }

    #[tokio::test]
    async fn primary_failure_still_completes() {
        let mut h = harness(19, true).await;
        h.results.set_failure(Some("db down".into())).await;

        h.flow.give_consent(ack()).await.unwrap();
        h.flow.start_survey(Some("36-45"), Some("other")).await.unwrap();
        h.flow.jump_to(2).unwrap();
        h.flow.advance().unwrap();

        assert_eq!(h.flow.phase(), SurveyPhase::Completed);
        let session_id = h.flow.session().session_id().unwrap();
        let outcome = h.flow.await_persistence().await.unwrap();
        assert_eq!(outcome.save_method, SaveMethod::FallbackLocal);
        assert!(h
            .local
            .get(&format!("survey_{}", session_id))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn progress_reports_navigation_state() {
        let mut h = harness(19, true).await;
        assert!(h.flow.progress().is_none());

        h.flow.give_consent(ack()).await.unwrap();
        h.flow.start_survey(Some("26-35"), Some("female")).await.unwrap();
        h.flow.select_answer(1, "A").unwrap();

        let progress = h.flow.progress().unwrap();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered_positions, vec![1]);
        assert!(progress.can_advance);
        assert!(!progress.can_retreat);
        assert_eq!(h.flow.current_question().unwrap().position, 1);
    }

    #[tokio::test]
    async fn reset_starts_a_new_session() {
        let mut h = harness(19, true).await;
        h.flow.give_consent(ack()).await.unwrap();
        let old = h.flow.session().session_id();

        h.flow.reset();

        assert_eq!(h.flow.phase(), SurveyPhase::Consent);
        h.flow.give_consent(ack()).await.unwrap();
        assert_ne!(h.flow.session().session_id(), old);
    }
}
