//! Completion summary computed before results are persisted.

use serde::{Deserialize, Serialize};

use crate::domain::booklet::Booklet;
use crate::domain::foundation::Timestamp;

use super::bundle::ResponseBundle;

/// Accuracy and timing aggregates for a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub total_questions: usize,
    pub answered_count: usize,
    pub correct_answers: usize,
    /// `correct_answers / total_questions * 100`; unanswered questions count as wrong.
    pub accuracy_percent: f64,
    pub total_time_ms: u64,
    /// Total time divided by answered count; 0 when nothing was answered.
    pub average_time_per_question_ms: f64,
    pub completed_at: Timestamp,
}

impl CompletionSummary {
    /// Scores `bundle` against every question in `booklet`.
    pub fn compute(bundle: &ResponseBundle, booklet: &Booklet) -> Self {
        let total_questions = booklet.len();
        let correct_answers = booklet
            .questions()
            .iter()
            .filter(|q| {
                bundle
                    .responses()
                    .get(&q.position)
                    .is_some_and(|label| q.is_correct(label))
            })
            .count();

        let accuracy_percent = if total_questions == 0 {
            0.0
        } else {
            correct_answers as f64 / total_questions as f64 * 100.0
        };

        let answered_count = bundle.answered_count();
        let average_time_per_question_ms = if answered_count == 0 {
            0.0
        } else {
            bundle.total_time_ms() as f64 / answered_count as f64
        };

        Self {
            total_questions,
            answered_count,
            correct_answers,
            accuracy_percent,
            total_time_ms: bundle.total_time_ms(),
            average_time_per_question_ms,
            completed_at: bundle.completed_at(),
        }
    }

    /// Accuracy rounded to one decimal place.
    pub fn accuracy_rounded(&self) -> f64 {
        (self.accuracy_percent * 10.0).round() / 10.0
    }
}

/// Renders elapsed milliseconds as `m:ss`.
pub fn format_elapsed(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{}:{:02}", minutes, seconds)
}
