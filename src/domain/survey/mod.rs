//! Survey module - session phases, navigation, and completion.
//!
//! # Module Organization
//!
//! - `phase` - phase state machine (consent, intake, in progress, completed)
//! - `intake` - demographic form values
//! - `navigator` - position, answers, and timing within a booklet
//! - `bundle` - finalized responses handed to persistence
//! - `summary` - accuracy and timing aggregates
//! - `session` - aggregate tying the phases together

mod bundle;
mod errors;
mod intake;
mod navigator;
mod phase;
mod session;
mod summary;

pub use bundle::{ResponseBundle, ResponseEntry};
pub use errors::SurveyError;
pub use intake::IntakeInfo;
pub use navigator::{Advance, NavigatorError, QuestionNavigator};
pub use phase::SurveyPhase;
pub use session::{PhaseAnnotation, SurveySession};
pub use summary::{format_elapsed, CompletionSummary};
