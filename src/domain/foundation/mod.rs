//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the survey domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BookletId, BookletPool, SessionId, UserId};
pub use state_machine::{StateMachine, TRANSITION_FIELD};
pub use timestamp::Timestamp;
