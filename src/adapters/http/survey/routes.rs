//! HTTP routes for survey endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    advance, assign_booklet, consent_connection, consent_report, create_session, delete_session,
    get_booklet, get_session, health, jump, retreat, retry_consent, save_response,
    select_answer, submit_intake, SurveyAppState,
};

/// Creates the survey router with all endpoints.
pub fn survey_routes(state: SurveyAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assign_booklet", post(assign_booklet))
        .route("/save_response", post(save_response))
        .route("/booklets/:id", get(get_booklet))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/intake", post(submit_intake))
        .route("/api/sessions/:id/answers", post(select_answer))
        .route("/api/sessions/:id/advance", post(advance))
        .route("/api/sessions/:id/retreat", post(retreat))
        .route("/api/sessions/:id/jump", post(jump))
        .route("/api/sessions/:id/consent/retry", post(retry_consent))
        .route("/api/sessions/:id/consent/report", get(consent_report))
        .route("/api/sessions/:id/consent/connection", get(consent_connection))
        .with_state(state)
}
