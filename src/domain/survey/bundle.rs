//! Finalized responses handed to persistence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::booklet::QuestionPosition;
use crate::domain::foundation::{BookletId, SessionId, Timestamp, ValidationError};

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub question_position: QuestionPosition,
    pub selected_label: String,
    pub response_latency_ms: u64,
}

/// A session's answers and timing, immutable once created.
///
/// # Invariants
///
/// - `responses` and `response_times` have identical key sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBundle {
    session_id: SessionId,
    booklet_id: BookletId,
    responses: BTreeMap<QuestionPosition, String>,
    response_times: BTreeMap<QuestionPosition, u64>,
    total_time_ms: u64,
    completed_at: Timestamp,
}

impl ResponseBundle {
    /// Builds a bundle.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the two maps are keyed differently
    pub fn new(
        session_id: SessionId,
        booklet_id: BookletId,
        responses: BTreeMap<QuestionPosition, String>,
        response_times: BTreeMap<QuestionPosition, u64>,
        total_time_ms: u64,
        completed_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if !responses.keys().eq(response_times.keys()) {
            return Err(ValidationError::invalid_format(
                "response_times",
                "must be keyed by exactly the answered positions",
            ));
        }
        Ok(Self {
            session_id,
            booklet_id,
            responses,
            response_times,
            total_time_ms,
            completed_at,
        })
    }

    /// Builds a bundle from maps the navigator keeps in lockstep.
    pub(super) fn assemble(
        session_id: SessionId,
        booklet_id: BookletId,
        responses: BTreeMap<QuestionPosition, String>,
        response_times: BTreeMap<QuestionPosition, u64>,
        total_time_ms: u64,
        completed_at: Timestamp,
    ) -> Self {
        debug_assert!(responses.keys().eq(response_times.keys()));
        Self {
            session_id,
            booklet_id,
            responses,
            response_times,
            total_time_ms,
            completed_at,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn booklet_id(&self) -> BookletId {
        self.booklet_id
    }

    /// Selected label per answered position.
    pub fn responses(&self) -> &BTreeMap<QuestionPosition, String> {
        &self.responses
    }

    /// Latency in milliseconds per answered position.
    pub fn response_times(&self) -> &BTreeMap<QuestionPosition, u64> {
        &self.response_times
    }

    /// Wall clock from first question shown to the finish action.
    pub fn total_time_ms(&self) -> u64 {
        self.total_time_ms
    }

    pub fn completed_at(&self) -> Timestamp {
        self.completed_at
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    /// Answers as entries, ordered by position.
    pub fn entries(&self) -> Vec<ResponseEntry> {
        self.responses
            .iter()
            .map(|(position, label)| ResponseEntry {
                question_position: *position,
                selected_label: label.clone(),
                response_latency_ms: self.response_times.get(position).copied().unwrap_or(0),
            })
            .collect()
    }
}
