//! Question navigator - position, answers, and per-question timing.
//!
//! The navigator walks a booklet's question sequence. It is pure: every
//! operation that depends on time takes `now` explicitly, so callers decide
//! which clock drives it.
//!
//! # Timing
//!
//! - `started_at` is fixed when the first question is shown
//! - `question_shown_at` resets whenever the current index changes
//! - an answer's latency is `now - question_shown_at` at selection time
//!
//! # Gating
//!
//! Moving forward requires an answer on the current question, except on the
//! last question: finishing is always possible there, so a participant can
//! submit partial data.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::booklet::{Booklet, QuestionPosition};
use crate::domain::foundation::{BookletId, SessionId, Timestamp};

use super::bundle::{ResponseBundle, ResponseEntry};

/// Navigation and answering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigatorError {
    #[error("Question position {0} is not part of this booklet")]
    UnknownQuestion(QuestionPosition),

    #[error("Question index {index} is outside 0..{total}")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("Answer label cannot be empty")]
    EmptyLabel,

    #[error("Question {0} must be answered before moving on")]
    CurrentUnanswered(QuestionPosition),

    #[error("The survey has already been finished")]
    AlreadyFinished,
}

/// Result of a forward step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this index.
    Moved { index: usize },
    /// Last question was passed; responses are final.
    Finished(ResponseBundle),
}

/// Tracks progress through one booklet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionNavigator {
    session_id: SessionId,
    booklet_id: BookletId,
    positions: Vec<QuestionPosition>,
    current_index: usize,
    responses: BTreeMap<QuestionPosition, String>,
    response_times: BTreeMap<QuestionPosition, u64>,
    started_at: Timestamp,
    question_shown_at: Timestamp,
    finished: bool,
}

impl QuestionNavigator {
    /// Shows the first question of `booklet` at `now`.
    pub fn start(session_id: SessionId, booklet: &Booklet, now: Timestamp) -> Self {
        Self {
            session_id,
            booklet_id: booklet.id(),
            positions: booklet.positions(),
            current_index: 0,
            responses: BTreeMap::new(),
            response_times: BTreeMap::new(),
            started_at: now,
            question_shown_at: now,
            finished: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// 0-based index into the question sequence.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Position of the question currently shown.
    pub fn current_position(&self) -> QuestionPosition {
        self.positions[self.current_index]
    }

    pub fn total(&self) -> usize {
        self.positions.len()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.positions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn question_shown_at(&self) -> Timestamp {
        self.question_shown_at
    }

    pub fn responses(&self) -> &BTreeMap<QuestionPosition, String> {
        &self.responses
    }

    pub fn response_times(&self) -> &BTreeMap<QuestionPosition, u64> {
        &self.response_times
    }

    /// Label recorded for `position`, if any.
    pub fn selected(&self, position: QuestionPosition) -> Option<&str> {
        self.responses.get(&position).map(String::as_str)
    }

    pub fn is_answered(&self, position: QuestionPosition) -> bool {
        self.responses.contains_key(&position)
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    /// Positions with a recorded answer, ascending.
    pub fn answered_positions(&self) -> Vec<QuestionPosition> {
        self.responses.keys().copied().collect()
    }

    /// `(current_index + 1) / total * 100`.
    pub fn progress_percent(&self) -> f64 {
        (self.current_index + 1) as f64 / self.positions.len() as f64 * 100.0
    }

    /// Whether the forward action is enabled for the caller.
    pub fn can_advance(&self) -> bool {
        !self.finished && (self.is_last() || self.is_answered(self.current_position()))
    }

    pub fn can_retreat(&self) -> bool {
        !self.finished && self.current_index > 0
    }

    /// Elapsed time since the first question was shown.
    pub fn elapsed_ms(&self, now: Timestamp) -> u64 {
        now.millis_since(&self.started_at)
    }

    /// Answers recorded so far, ordered by position.
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

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records or overwrites the answer for `position`.
    ///
    /// # Errors
    ///
    /// - `AlreadyFinished` after the final advance
    /// - `UnknownQuestion` if the booklet has no such position
    /// - `EmptyLabel` for a blank label
    pub fn select_answer(
        &mut self,
        position: QuestionPosition,
        label: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), NavigatorError> {
        self.ensure_open()?;
        if !self.positions.contains(&position) {
            return Err(NavigatorError::UnknownQuestion(position));
        }
        let label = label.into();
        if label.trim().is_empty() {
            return Err(NavigatorError::EmptyLabel);
        }

        self.responses.insert(position, label);
        self.response_times
            .insert(position, now.millis_since(&self.question_shown_at));
        Ok(())
    }

    /// Moves forward, or finalizes the responses on the last question.
    ///
    /// # Errors
    ///
    /// - `AlreadyFinished` if a bundle was already produced
    /// - `CurrentUnanswered` when not on the last question and it has no answer
    pub fn advance(&mut self, now: Timestamp) -> Result<Advance, NavigatorError> {
        self.ensure_open()?;

        if self.is_last() {
            let bundle = ResponseBundle::assemble(
                self.session_id,
                self.booklet_id,
                self.responses.clone(),
                self.response_times.clone(),
                now.millis_since(&self.started_at),
                now,
            );
            self.finished = true;
            return Ok(Advance::Finished(bundle));
        }

        let position = self.current_position();
        if !self.is_answered(position) {
            return Err(NavigatorError::CurrentUnanswered(position));
        }

        self.show(self.current_index + 1, now);
        Ok(Advance::Moved {
            index: self.current_index,
        })
    }

    /// Moves back one question; stays put on the first question.
    ///
    /// Previously recorded answers are kept.
    pub fn retreat(&mut self, now: Timestamp) -> Result<usize, NavigatorError> {
        self.ensure_open()?;
        if self.current_index > 0 {
            self.show(self.current_index - 1, now);
        }
        Ok(self.current_index)
    }

    /// Jumps directly to any question, answered or not.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` for an index past the end
    pub fn jump_to(&mut self, index: usize, now: Timestamp) -> Result<usize, NavigatorError> {
        self.ensure_open()?;
        if index >= self.positions.len() {
            return Err(NavigatorError::IndexOutOfRange {
                index,
                total: self.positions.len(),
            });
        }
        self.show(index, now);
        Ok(self.current_index)
    }

    fn show(&mut self, index: usize, now: Timestamp) {
        if index != self.current_index {
            self.current_index = index;
            self.question_shown_at = now;
        }
    }

    fn ensure_open(&self) -> Result<(), NavigatorError> {
        if self.finished {
            Err(NavigatorError::AlreadyFinished)
        } else {
            Ok(())
        }
    }
}
