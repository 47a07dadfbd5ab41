//! HTTP DTOs for survey endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::handlers::{PersistOutcome, Progress, SecondaryWrite, SurveyFlow};
use crate::domain::booklet::{Question, QuestionPosition};
use crate::domain::consent::{ConsentRecord, SaveMethod};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::survey::{CompletionSummary, PhaseAnnotation, SurveyPhase};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of the legacy batched answer write.
///
/// Extra fields the old client sends (such as `user_info`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveResponseRequest {
    pub user_id: String,
    pub booklet_id: u32,
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
    #[serde(default)]
    pub ts: Option<i64>,
}

/// Consent form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentRequest {
    pub consent_given: bool,
    /// Client-side time the box was ticked; server time when absent.
    #[serde(default)]
    pub consent_timestamp: Option<Timestamp>,
}

/// Demographic intake.
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub position: QuestionPosition,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JumpRequest {
    pub index: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct AssignBookletResponse {
    pub booklet_id: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Consent outcome returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentResponse {
    pub session_id: String,
    pub save_method: SaveMethod,
    pub storage_id: String,
    pub consent_timestamp: Timestamp,
    /// True when the primary store did not take the record.
    pub warning: bool,
}

impl From<&ConsentRecord> for ConsentResponse {
    fn from(record: &ConsentRecord) -> Self {
        Self {
            session_id: record.session_id.to_string(),
            save_method: record.save_method,
            storage_id: record.storage_id.clone(),
            consent_timestamp: record.consent_timestamp,
            warning: record.needs_warning(),
        }
    }
}

/// Persistence result shown once the session completes.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    pub save_method: SaveMethod,
    pub storage_id: String,
    pub summary: CompletionSummary,
    /// Accuracy rounded to one decimal place.
    pub accuracy: f64,
    /// Per-question row write, reported separately from `save_method`.
    pub secondary: SecondaryWrite,
}

impl From<&PersistOutcome> for CompletionResponse {
    fn from(outcome: &PersistOutcome) -> Self {
        Self {
            save_method: outcome.save_method,
            storage_id: outcome.storage_id.clone(),
            summary: outcome.summary.clone(),
            accuracy: outcome.summary.accuracy_rounded(),
            secondary: outcome.secondary.clone(),
        }
    }
}

/// Snapshot of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: Option<String>,
    pub phase: SurveyPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booklet_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<PhaseAnnotation>,
    /// Results of a completed session are still being saved.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub saving: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionResponse>,
}

impl From<&SurveyFlow> for SessionResponse {
    fn from(flow: &SurveyFlow) -> Self {
        let session = flow.session();
        Self {
            session_id: session.session_id().map(|id| id.to_string()),
            phase: session.phase(),
            booklet_id: flow.assigned_booklet().map(|id| id.value()),
            consent: session.consent().map(ConsentResponse::from),
            progress: flow.progress(),
            current_question: flow.current_question().cloned(),
            last_error: session.last_annotation().cloned(),
            saving: flow.is_saving(),
            completion: flow.persistence_outcome().map(CompletionResponse::from),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn session_not_found(id: &str) -> Self {
        Self::new(ErrorCode::SessionNotFound, format!("Session not found: {}", id))
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        let details = (!err.details.is_empty()).then(|| serde_json::json!(err.details));
        Self {
            code: err.code.to_string(),
            message: err.message,
            details,
        }
    }
}
