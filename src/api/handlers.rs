//! HTTP request handlers

use super::types::{
    ErrorResponse, HintResponse, ResetResponse, SessionRequest, SessionSnapshot, SimulateRequest,
};
use super::AppState;
use crate::coach::CoachError;
use crate::generation::GenerationError;
use crate::orchestrator::{TurnError, TurnInput, TurnOutcome};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Header that may carry the session id when the body does not
pub const SESSION_HEADER: &str = "x-session-id";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/simulate", post(simulate))
        .route("/api/hint", post(hint))
        .route("/api/reset-sim", post(reset_sim))
        .route("/api/sessions/:id", get(get_session))
        .route("/version", get(get_version))
        .with_state(state)
}

/// Body field first, then the header
fn requested_session_id<'a>(body: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    body.filter(|id| !id.trim().is_empty()).or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
    })
}

// ============================================================
// Turns
// ============================================================

async fn simulate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, AppError> {
    let Json(req) = payload?;
    let session_id = state
        .orchestrator
        .resolve_session_id(requested_session_id(req.session_id.as_deref(), &headers))?;

    let input = TurnInput {
        training_config: req.training_config(),
        pitch: req.pitch.unwrap_or_default(),
    };

    let outcome = state.orchestrator.handle_turn(&session_id, input).await?;
    Ok(Json(outcome))
}

// ============================================================
// Side Channels
// ============================================================

async fn hint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<SessionRequest>>,
) -> Result<Json<HintResponse>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let session_id = state
        .orchestrator
        .resolve_session_id(requested_session_id(req.session_id.as_deref(), &headers))?;

    let hint = state.orchestrator.hint(&session_id).await?;
    Ok(Json(HintResponse { hint }))
}

async fn reset_sim(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<SessionRequest>>,
) -> Result<Json<ResetResponse>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let session_id = state
        .orchestrator
        .resolve_session_id(requested_session_id(req.session_id.as_deref(), &headers))?;

    state.orchestrator.reset(&session_id);
    Ok(Json(ResetResponse {
        ok: true,
        session_id,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state
        .orchestrator
        .snapshot(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;
    Ok(Json(session.into()))
}

async fn get_version() -> &'static str {
    concat!("doorstep-sim ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    GatewayTimeout(String),
    ServiceUnavailable(String),
}

impl From<TurnError> for AppError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::EmptyPitch | TurnError::MissingSessionId => {
                AppError::BadRequest(err.to_string())
            }
            TurnError::Generation(GenerationError::Timeout(_)) => {
                AppError::GatewayTimeout("Customer reply timed out.".to_string())
            }
            TurnError::Generation(GenerationError::Unavailable) => {
                AppError::ServiceUnavailable("No generation model configured.".to_string())
            }
            TurnError::Generation(_) => {
                AppError::BadGateway("Failed to generate customer reply.".to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<CoachError> for AppError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::Timeout(_) => AppError::GatewayTimeout("Hint timed out.".to_string()),
            CoachError::Unavailable => {
                AppError::ServiceUnavailable("No coaching model configured.".to_string())
            }
            CoachError::Generation(_) => AppError::BadGateway("Failed to generate hint".to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
