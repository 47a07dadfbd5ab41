//! HTTP handlers for survey endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::{
    FlowStep, SaveResponseRowsCommand, SaveResponseRowsHandler, SurveyFlow, SurveyServices,
};
use crate::domain::consent::ConsentAck;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp};
use crate::domain::survey::{SurveyError, SurveyPhase};
use crate::ports::BookletSourceError;

use super::dto::{
    AnswerRequest, AssignBookletResponse, ConsentRequest, ConsentResponse, ErrorResponse,
    HealthResponse, IntakeRequest, JumpRequest, SaveResponseRequest, SessionResponse,
};
use super::registry::{SessionRegistry, SharedFlow};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SurveyAppState {
    services: SurveyServices,
    save_rows: Arc<SaveResponseRowsHandler>,
    sessions: SessionRegistry,
    verbose_errors: bool,
}

impl SurveyAppState {
    pub fn new(services: SurveyServices, save_rows: Arc<SaveResponseRowsHandler>) -> Self {
        Self {
            services,
            save_rows,
            sessions: SessionRegistry::new(),
            verbose_errors: false,
        }
    }

    /// Include underlying error text in 5xx bodies.
    pub fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    pub fn services(&self) -> &SurveyServices {
        &self.services
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    async fn flow(&self, raw_id: &str) -> Result<SharedFlow, Response> {
        let not_found = || {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::session_not_found(raw_id)),
            )
                .into_response()
        };
        let id = raw_id.parse::<SessionId>().map_err(|_| not_found())?;
        self.sessions.get(&id).await.ok_or_else(not_found)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Content and legacy endpoints
// ════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

/// POST /assign_booklet - Draw a booklet for a new participant
pub async fn assign_booklet(State(state): State<SurveyAppState>) -> Response {
    let result = state.services.assigner.handle();
    let response = AssignBookletResponse {
        booklet_id: result.booklet_id.value(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /save_response - Legacy per-question row write
pub async fn save_response(
    State(state): State<SurveyAppState>,
    Json(req): Json<SaveResponseRequest>,
) -> Response {
    let cmd = SaveResponseRowsCommand {
        user_id: req.user_id,
        booklet_id: req.booklet_id,
        responses: req.responses,
        ts: req.ts,
    };

    match state.save_rows.handle(cmd).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// GET /booklets/:id - Ordered question list for one booklet
pub async fn get_booklet(State(state): State<SurveyAppState>, Path(id): Path<u32>) -> Response {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                ErrorCode::BookletNotFound,
                format!("Booklet not found: {}", id),
            )),
        )
            .into_response()
    };

    let Ok(booklet_id) = state.services.assigner.pool().booklet(id) else {
        return not_found();
    };

    match state.services.booklets.load(booklet_id).await {
        Ok(booklet) => (StatusCode::OK, Json(booklet.questions().to_vec())).into_response(),
        Err(BookletSourceError::NotFound(_)) => not_found(),
        Err(e) => {
            tracing::warn!(booklet_id = %booklet_id, error = %e, "Booklet content unavailable");
            handle_survey_error(SurveyError::content_load(e.to_string()), state.verbose_errors)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session endpoints
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Record consent and open a session
pub async fn create_session(
    State(state): State<SurveyAppState>,
    headers: HeaderMap,
    Json(req): Json<ConsentRequest>,
) -> Response {
    let timestamp = req.consent_timestamp.unwrap_or_else(Timestamp::now);
    let mut ack = ConsentAck::new(req.consent_given, timestamp);
    if let Some(agent) = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
    {
        ack = ack.with_client_context(agent);
    }

    let mut flow = SurveyFlow::new(state.services.clone());
    let session_id = match flow.give_consent(ack).await {
        Ok(record) => record.session_id,
        Err(e) => return handle_survey_error(e, state.verbose_errors),
    };

    let response = SessionResponse::from(&flow);
    state.sessions.insert(session_id, flow).await;
    (StatusCode::CREATED, Json(response)).into_response()
}

/// GET /api/sessions/:id - Phase, progress and current question
///
/// `completion` appears once the background save has finished; until then
/// the snapshot reports `saving: true`.
pub async fn get_session(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    if flow.phase() == SurveyPhase::Completed {
        flow.poll_persistence().await;
    }
    (StatusCode::OK, Json(SessionResponse::from(&*flow))).into_response()
}

/// DELETE /api/sessions/:id - Discard a session
pub async fn delete_session(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    if let Ok(id) = session_id.parse::<SessionId>() {
        state.sessions.remove(&id).await;
    }
    shared.lock().await.reset();
    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/sessions/:id/intake - Submit demographics and start the survey
pub async fn submit_intake(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
    Json(req): Json<IntakeRequest>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    match flow
        .start_survey(req.age.as_deref(), req.gender.as_deref())
        .await
    {
        Ok(_) => (StatusCode::OK, Json(SessionResponse::from(&*flow))).into_response(),
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// POST /api/sessions/:id/answers - Select or change an answer
pub async fn select_answer(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    match flow.select_answer(req.position, req.label) {
        Ok(()) => (StatusCode::OK, Json(SessionResponse::from(&*flow))).into_response(),
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// POST /api/sessions/:id/advance - Next question, or finish
///
/// Finishing answers with the `completed` snapshot straight away; results
/// are saved in the background.
pub async fn advance(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    match flow.advance() {
        Ok(FlowStep::Completed | FlowStep::Moved { .. }) => {
            (StatusCode::OK, Json(SessionResponse::from(&*flow))).into_response()
        }
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// POST /api/sessions/:id/retreat - Previous question
pub async fn retreat(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    match flow.retreat() {
        Ok(_) => (StatusCode::OK, Json(SessionResponse::from(&*flow))).into_response(),
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// POST /api/sessions/:id/jump - Go to any question by index
pub async fn jump(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
    Json(req): Json<JumpRequest>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    match flow.jump_to(req.index) {
        Ok(_) => (StatusCode::OK, Json(SessionResponse::from(&*flow))).into_response(),
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// POST /api/sessions/:id/consent/retry - Re-save consent
pub async fn retry_consent(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let mut flow = shared.lock().await;
    match flow.retry_consent_save().await {
        Ok(record) => (StatusCode::OK, Json(ConsentResponse::from(record))).into_response(),
        Err(e) => handle_survey_error(e, state.verbose_errors),
    }
}

/// GET /api/sessions/:id/consent/report - Diagnostics for a degraded save
///
/// 204 when consent reached the primary store.
pub async fn consent_report(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let flow = shared.lock().await;
    match flow.consent_report() {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /api/sessions/:id/consent/connection - Probe the primary consent store
pub async fn consent_connection(
    State(state): State<SurveyAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match state.flow(&session_id).await {
        Ok(flow) => flow,
        Err(response) => return response,
    };
    let flow = shared.lock().await;
    match flow.check_primary_connection().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response(),
        Err(e) => {
            let body = ErrorResponse::new(ErrorCode::DatabaseError, "Primary store unreachable");
            let body = if state.verbose_errors {
                body.with_details(serde_json::json!({ "error": e.to_string() }))
            } else {
                body
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_survey_error(error: SurveyError, verbose: bool) -> Response {
    let error = DomainError::from(error);
    let status = match error.code {
        ErrorCode::ValidationFailed | ErrorCode::ConsentRequired | ErrorCode::QuestionUnanswered => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::SessionNotFound | ErrorCode::BookletNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidStateTransition | ErrorCode::SurveyFinished => StatusCode::CONFLICT,
        ErrorCode::ContentLoadFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::DatabaseError | ErrorCode::CacheError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = if status.is_server_error() {
        tracing::error!(code = %error.code, error = %error.message, "Request failed");
        let body = ErrorResponse::new(error.code, "The request could not be completed");
        if verbose {
            body.with_details(serde_json::json!({ "error": error.message }))
        } else {
            body
        }
    } else {
        ErrorResponse::from(error)
    };

    (status, Json(body)).into_response()
}
