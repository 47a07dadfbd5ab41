//! Survey session aggregate.
//!
//! Owns everything one participant produces: the consent record, intake
//! answers, the assigned booklet, navigator state, and the final bundle.
//! Fields fill in strictly in phase order and the phase only changes
//! through [`StateMachine::transition_to`].

use serde::Serialize;

use crate::domain::booklet::{Booklet, Question, QuestionPosition};
use crate::domain::consent::ConsentRecord;
use crate::domain::foundation::{
    BookletId, ErrorCode, SessionId, StateMachine, Timestamp, ValidationError,
};

use super::bundle::ResponseBundle;
use super::errors::SurveyError;
use super::intake::IntakeInfo;
use super::navigator::{Advance, QuestionNavigator};
use super::phase::SurveyPhase;

/// Error recorded against a phase without changing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseAnnotation {
    pub phase: SurveyPhase,
    pub code: String,
    pub message: String,
    pub at: Timestamp,
}

/// One participant's end-to-end survey session.
///
/// # Invariants
///
/// - `consent` is set once the phase leaves `Consent`
/// - `intake`, `booklet` and `navigator` are set once the phase reaches `InProgress`
/// - `bundle` is set exactly when the phase is `Completed`
#[derive(Debug, Clone, Default)]
pub struct SurveySession {
    phase: SurveyPhase,
    consent: Option<ConsentRecord>,
    intake: Option<IntakeInfo>,
    booklet: Option<Booklet>,
    navigator: Option<QuestionNavigator>,
    bundle: Option<ResponseBundle>,
    annotations: Vec<PhaseAnnotation>,
}

impl SurveySession {
    /// Empty session waiting for consent.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    /// Identity assigned when consent was recorded.
    pub fn session_id(&self) -> Option<SessionId> {
        self.consent.as_ref().map(|c| c.session_id)
    }

    pub fn consent(&self) -> Option<&ConsentRecord> {
        self.consent.as_ref()
    }

    pub fn intake(&self) -> Option<&IntakeInfo> {
        self.intake.as_ref()
    }

    pub fn booklet(&self) -> Option<&Booklet> {
        self.booklet.as_ref()
    }

    pub fn booklet_id(&self) -> Option<BookletId> {
        self.booklet.as_ref().map(Booklet::id)
    }

    pub fn navigator(&self) -> Option<&QuestionNavigator> {
        self.navigator.as_ref()
    }

    pub fn bundle(&self) -> Option<&ResponseBundle> {
        self.bundle.as_ref()
    }

    pub fn annotations(&self) -> &[PhaseAnnotation] {
        &self.annotations
    }

    pub fn last_annotation(&self) -> Option<&PhaseAnnotation> {
        self.annotations.last()
    }

    /// Question currently shown, while the survey is running.
    pub fn current_question(&self) -> Option<&Question> {
        let navigator = self.navigator.as_ref()?;
        if navigator.is_finished() {
            return None;
        }
        self.booklet.as_ref()?.question_at(navigator.current_index())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Phase transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Accepts a consent record from any storage tier and moves to intake.
    ///
    /// # Errors
    ///
    /// - `Validation` if the record does not carry consent
    /// - `InvalidState` if consent was already recorded
    pub fn accept_consent(&mut self, record: ConsentRecord) -> Result<(), SurveyError> {
        if !record.consent_given {
            return Err(ValidationError::invalid_format(
                "consent_given",
                "consent must be given to participate",
            )
            .into());
        }
        self.transition(SurveyPhase::Intake)?;
        self.consent = Some(record);
        Ok(())
    }

    /// Swaps in the result of re-saving the same consent.
    ///
    /// Only the storage outcome may differ; session and timestamp must match.
    pub fn replace_consent_save(&mut self, record: ConsentRecord) -> Result<(), SurveyError> {
        match &self.consent {
            Some(current)
                if current.session_id == record.session_id
                    && current.consent_timestamp == record.consent_timestamp =>
            {
                self.consent = Some(record);
                Ok(())
            }
            Some(_) => Err(SurveyError::invalid_state(
                "re-saved consent belongs to another session",
            )),
            None => Err(SurveyError::invalid_state("no consent recorded")),
        }
    }

    /// Starts the question sequence with a loaded booklet.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside the intake phase
    pub fn begin_survey(
        &mut self,
        intake: IntakeInfo,
        booklet: Booklet,
        now: Timestamp,
    ) -> Result<(), SurveyError> {
        let session_id = self
            .session_id()
            .ok_or_else(|| SurveyError::invalid_state("no consent recorded"))?;
        self.transition(SurveyPhase::InProgress)?;
        self.navigator = Some(QuestionNavigator::start(session_id, &booklet, now));
        self.intake = Some(intake);
        self.booklet = Some(booklet);
        Ok(())
    }

    pub fn select_answer(
        &mut self,
        position: QuestionPosition,
        label: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), SurveyError> {
        self.navigator_mut()?.select_answer(position, label, now)?;
        Ok(())
    }

    /// Moves forward; the final advance completes the session.
    ///
    /// On completion the bundle is stored on the session and also returned,
    /// exactly once.
    pub fn advance(&mut self, now: Timestamp) -> Result<Advance, SurveyError> {
        let step = self.navigator_mut()?.advance(now)?;
        if let Advance::Finished(bundle) = &step {
            self.transition(SurveyPhase::Completed)?;
            self.bundle = Some(bundle.clone());
        }
        Ok(step)
    }

    pub fn retreat(&mut self, now: Timestamp) -> Result<usize, SurveyError> {
        Ok(self.navigator_mut()?.retreat(now)?)
    }

    pub fn jump_to(&mut self, index: usize, now: Timestamp) -> Result<usize, SurveyError> {
        Ok(self.navigator_mut()?.jump_to(index, now)?)
    }

    /// Records an error against the current phase without moving it.
    pub fn annotate(&mut self, code: ErrorCode, message: impl Into<String>, at: Timestamp) {
        self.annotations.push(PhaseAnnotation {
            phase: self.phase,
            code: code.to_string(),
            message: message.into(),
            at,
        });
    }

    fn transition(&mut self, target: SurveyPhase) -> Result<(), SurveyError> {
        self.phase = self
            .phase
            .transition_to(target)
            .map_err(|e| SurveyError::invalid_state(e.to_string()))?;
        Ok(())
    }

    fn navigator_mut(&mut self) -> Result<&mut QuestionNavigator, SurveyError> {
        if self.phase != SurveyPhase::InProgress {
            return Err(SurveyError::invalid_state(format!(
                "no survey in progress (phase is {})",
                self.phase
            )));
        }
        self.navigator
            .as_mut()
            .ok_or_else(|| SurveyError::invalid_state("navigator not started"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consent::{ConsentAck, ConsentDraft};
    use crate::domain::survey::NavigatorError;

    fn t0() -> Timestamp {
        Timestamp::from_unix_millis(1_700_000_000_000).unwrap()
    }

    fn consent(given: bool) -> ConsentRecord {
        let ack = ConsentAck::new(given, t0()).with_client_context("test-agent");
        ConsentRecord::primary(ConsentDraft::for_new_session(&ack), "row-1")
    }

    fn booklet() -> Booklet {
        let questions = (0..3)
            .map(|p| {
                serde_json::from_value(serde_json::json!({
                    "position": p,
                    "question": format!("Q{}", p),
                    "options": "A, B, C",
                    "answer": "A",
                }))
                .unwrap()
            })
            .collect();
        Booklet::new(BookletId::new(5, 19).unwrap(), questions).unwrap()
    }

    fn intake() -> IntakeInfo {
        IntakeInfo::new(Some("26-35"), Some("female")).unwrap()
    }

    fn in_progress() -> SurveySession {
        let mut session = SurveySession::new();
        session.accept_consent(consent(true)).unwrap();
        session.begin_survey(intake(), booklet(), t0()).unwrap();
        session
    }

    #[test]
    fn new_session_waits_for_consent() {
        let session = SurveySession::new();
        assert_eq!(session.phase(), SurveyPhase::Consent);
        assert!(session.session_id().is_none());
    }

    #[test]
    fn consent_moves_to_intake_and_fixes_identity() {
        let mut session = SurveySession::new();
        let record = consent(true);
        let id = record.session_id;
        session.accept_consent(record).unwrap();
        assert_eq!(session.phase(), SurveyPhase::Intake);
        assert_eq!(session.session_id(), Some(id));
    }

    #[test]
    fn refused_consent_keeps_consent_phase() {
        let mut session = SurveySession::new();
        assert!(session.accept_consent(consent(false)).is_err());
        assert_eq!(session.phase(), SurveyPhase::Consent);
    }

    #[test]
    fn second_consent_is_rejected() {
        let mut session = SurveySession::new();
        session.accept_consent(consent(true)).unwrap();
        let err = session.accept_consent(consent(true)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn cannot_start_survey_before_consent() {
        let mut session = SurveySession::new();
        assert!(session.begin_survey(intake(), booklet(), t0()).is_err());
        assert_eq!(session.phase(), SurveyPhase::Consent);
    }

    #[test]
    fn answers_require_running_survey() {
        let mut session = SurveySession::new();
        session.accept_consent(consent(true)).unwrap();
        assert!(matches!(
            session.select_answer(0, "A", t0()),
            Err(SurveyError::InvalidState(_))
        ));
    }

    #[test]
    fn final_advance_completes_with_bundle() {
        let mut session = in_progress();
        for p in 0..3 {
            session.select_answer(p, "A", t0().plus_millis(100)).unwrap();
            session.advance(t0().plus_millis(1_000 * (p as i64 + 1))).unwrap();
        }
        assert_eq!(session.phase(), SurveyPhase::Completed);
        let bundle = session.bundle().unwrap();
        assert_eq!(bundle.booklet_id().value(), 5);
        assert_eq!(bundle.total_time_ms(), 3_000);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn completed_session_rejects_navigation() {
        let mut session = in_progress();
        session.jump_to(2, t0()).unwrap();
        session.advance(t0()).unwrap();
        assert!(matches!(
            session.advance(t0()),
            Err(SurveyError::InvalidState(_))
        ));
    }

    #[test]
    fn unanswered_advance_keeps_phase() {
        let mut session = in_progress();
        let err = session.advance(t0()).unwrap_err();
        assert_eq!(err, SurveyError::Navigation(NavigatorError::CurrentUnanswered(0)));
        assert_eq!(session.phase(), SurveyPhase::InProgress);
    }

    #[test]
    fn annotations_record_current_phase() {
        let mut session = SurveySession::new();
        session.accept_consent(consent(true)).unwrap();
        session.annotate(ErrorCode::ContentLoadFailed, "booklet 5 unavailable", t0());
        let note = session.last_annotation().unwrap();
        assert_eq!(note.phase, SurveyPhase::Intake);
        assert_eq!(note.code, "CONTENT_LOAD_FAILED");
    }

    #[test]
    fn current_question_follows_navigator() {
        let mut session = in_progress();
        session.jump_to(1, t0()).unwrap();
        assert_eq!(session.current_question().unwrap().position, 1);
    }

    #[test]
    fn consent_resave_must_match_session() {
        let mut session = SurveySession::new();
        let record = consent(true);
        session.accept_consent(record.clone()).unwrap();

        let mut resaved = record.clone();
        resaved.storage_id = "row-2".to_string();
        session.replace_consent_save(resaved).unwrap();
        assert_eq!(session.consent().unwrap().storage_id, "row-2");

        assert!(session.replace_consent_save(consent(true)).is_err());
        assert_eq!(session.phase(), SurveyPhase::Intake);
    }
}
