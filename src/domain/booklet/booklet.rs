//! Booklet - the ordered question sequence assigned to a session.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::BookletId;

use super::question::{Question, QuestionPosition};

/// Content problems that make a booklet unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookletError {
    #[error("Booklet {0} contains no questions")]
    Empty(BookletId),

    #[error("Booklet {booklet_id} repeats question position {position}")]
    DuplicatePosition {
        booklet_id: BookletId,
        position: QuestionPosition,
    },
}

/// Immutable, ordered set of questions.
///
/// # Invariants
///
/// - at least one question
/// - positions are unique
/// - questions are ordered by position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booklet {
    id: BookletId,
    questions: Vec<Question>,
}

impl Booklet {
    /// Builds a booklet, ordering questions by position.
    ///
    /// # Errors
    ///
    /// - `Empty` if there are no questions
    /// - `DuplicatePosition` if two questions share a position
    pub fn new(id: BookletId, mut questions: Vec<Question>) -> Result<Self, BookletError> {
        if questions.is_empty() {
            return Err(BookletError::Empty(id));
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.position) {
                return Err(BookletError::DuplicatePosition {
                    booklet_id: id,
                    position: q.position,
                });
            }
        }

        questions.sort_by_key(|q| q.position);
        Ok(Self { id, questions })
    }

    pub fn id(&self) -> BookletId {
        self.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; a booklet holds at least one question.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at a 0-based display index.
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Question with the given position.
    pub fn find(&self, position: QuestionPosition) -> Option<&Question> {
        self.questions.iter().find(|q| q.position == position)
    }

    /// Positions in display order.
    pub fn positions(&self) -> Vec<QuestionPosition> {
        self.questions.iter().map(|q| q.position).collect()
    }

    /// Correct labels keyed by position, for questions that have one.
    pub fn answer_key(&self) -> BTreeMap<QuestionPosition, String> {
        self.questions
            .iter()
            .filter_map(|q| q.answer.clone().map(|a| (q.position, a)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(position: QuestionPosition, answer: Option<&str>) -> Question {
        serde_json::from_value(serde_json::json!({
            "position": position,
            "question": format!("Q{}", position),
            "options": "A, B, C, D",
            "answer": answer,
        }))
        .unwrap()
    }

    fn id() -> BookletId {
        BookletId::new(2, 19).unwrap()
    }

    #[test]
    fn orders_questions_by_position() {
        let booklet = Booklet::new(
            id(),
            vec![question(3, None), question(1, None), question(2, None)],
        )
        .unwrap();
        assert_eq!(booklet.positions(), vec![1, 2, 3]);
        assert_eq!(booklet.question_at(0).unwrap().position, 1);
    }

    #[test]
    fn rejects_empty_booklet() {
        assert_eq!(Booklet::new(id(), vec![]), Err(BookletError::Empty(id())));
    }

    #[test]
    fn rejects_duplicate_positions() {
        let result = Booklet::new(id(), vec![question(1, None), question(1, None)]);
        assert!(matches!(
            result,
            Err(BookletError::DuplicatePosition { position: 1, .. })
        ));
    }

    #[test]
    fn answer_key_skips_questions_without_answers() {
        let booklet =
            Booklet::new(id(), vec![question(1, Some("A")), question(2, None)]).unwrap();
        let key = booklet.answer_key();
        assert_eq!(key.len(), 1);
        assert_eq!(key.get(&1), Some(&"A".to_string()));
    }

    #[test]
    fn find_looks_up_by_position() {
        let booklet = Booklet::new(id(), vec![question(5, None), question(9, None)]).unwrap();
        assert_eq!(booklet.find(9).unwrap().prompt, "Q9");
        assert!(booklet.find(1).is_none());
    }
}
