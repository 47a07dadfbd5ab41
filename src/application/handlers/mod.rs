//! Application handlers.
//!
//! Each handler holds its ports as `Arc<dyn Port>` and exposes a `handle`
//! entry point; [`SurveyFlow`] composes them into a participant session.

mod assign_booklet;
mod persist_responses;
mod record_consent;
mod save_response_rows;
mod survey_flow;

pub use assign_booklet::{AssignBookletResult, BookletAssigner};
pub use persist_responses::{
    PersistOutcome, PersistencePipeline, SecondaryWrite, SurveyResultRecord, PRIMARY_SAVE_FAILED,
};
pub use record_consent::{ConsentRecorder, RecordConsentResult};
pub use save_response_rows::{SaveResponseRowsCommand, SaveResponseRowsHandler};
pub use survey_flow::{FlowStep, Progress, SurveyFlow, SurveyServices};
