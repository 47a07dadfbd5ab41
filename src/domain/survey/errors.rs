//! Survey-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError, TRANSITION_FIELD};

use super::navigator::NavigatorError;

/// Errors raised while driving a survey session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    /// Missing intake field or consent not given. Recoverable by correcting input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Booklet content could not be fetched or parsed. Retry the intake step.
    #[error("Failed to load booklet content: {0}")]
    ContentLoad(String),

    /// Operation not allowed in the current phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Navigation(#[from] NavigatorError),

    /// A persistence tier failed. Never blocks phase progression.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SurveyError {
    pub fn content_load(message: impl Into<String>) -> Self {
        SurveyError::ContentLoad(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        SurveyError::InvalidState(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        SurveyError::Storage(message.into())
    }

    /// True when the participant can fix the problem and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SurveyError::Validation(_) | SurveyError::ContentLoad(_) | SurveyError::Navigation(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SurveyError::Validation(e) if e.field() == "consent_given" => ErrorCode::ConsentRequired,
            SurveyError::Validation(e) if e.field() == TRANSITION_FIELD => {
                ErrorCode::InvalidStateTransition
            }
            SurveyError::Validation(_) => ErrorCode::ValidationFailed,
            SurveyError::ContentLoad(_) => ErrorCode::ContentLoadFailed,
            SurveyError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SurveyError::Navigation(NavigatorError::CurrentUnanswered(_)) => {
                ErrorCode::QuestionUnanswered
            }
            SurveyError::Navigation(NavigatorError::AlreadyFinished) => ErrorCode::SurveyFinished,
            SurveyError::Navigation(_) => ErrorCode::ValidationFailed,
            SurveyError::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<SurveyError> for DomainError {
    fn from(err: SurveyError) -> Self {
        let code = err.code();
        match &err {
            SurveyError::Validation(e) => {
                let field = e.field().to_string();
                DomainError::new(code, e.to_string()).with_detail("field", field)
            }
            SurveyError::Navigation(NavigatorError::CurrentUnanswered(position)) => {
                DomainError::new(code, err.to_string())
                    .with_detail("position", position.to_string())
            }
            _ => DomainError::new(code, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanswered_question_has_dedicated_code() {
        let err: SurveyError = NavigatorError::CurrentUnanswered(3).into();
        assert_eq!(err.code(), ErrorCode::QuestionUnanswered);
        assert!(err.is_retryable());
    }

    #[test]
    fn refused_consent_maps_to_consent_required() {
        let err: SurveyError = ValidationError::invalid_format("consent_given", "must be true").into();
        assert_eq!(err.code(), ErrorCode::ConsentRequired);
    }

    #[test]
    fn bad_transition_maps_to_invalid_state_code() {
        let err: SurveyError = ValidationError::invalid_format(TRANSITION_FIELD, "nope").into();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert!(!SurveyError::invalid_state("x").is_retryable());
    }

    #[test]
    fn converts_to_domain_error() {
        let err: DomainError = SurveyError::content_load("timeout").into();
        assert_eq!(err.code, ErrorCode::ContentLoadFailed);
        assert_eq!(err.message, "Failed to load booklet content: timeout");
        assert!(err.details.is_empty());
    }

    #[test]
    fn domain_error_keeps_offending_field() {
        let err: DomainError = SurveyError::from(ValidationError::empty_field("gender")).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field").map(String::as_str), Some("gender"));
    }
}
