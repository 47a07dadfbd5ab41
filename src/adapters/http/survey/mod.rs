//! HTTP adapter for the survey service.
//!
//! Covers the legacy content endpoints (`/assign_booklet`, `/save_response`,
//! `/booklets/:id`) and the server-held session API under `/api/sessions`.

mod dto;
mod handlers;
mod registry;
mod routes;

pub use dto::{
    AnswerRequest, AssignBookletResponse, CompletionResponse, ConsentRequest, ConsentResponse,
    ErrorResponse, IntakeRequest, JumpRequest, SaveResponseRequest, SessionResponse,
};
pub use handlers::SurveyAppState;
pub use registry::{SessionRegistry, SharedFlow};
pub use routes::survey_routes;
