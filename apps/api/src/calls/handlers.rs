//! Axum route handlers for call registration, retrieval and live session events.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::calls::register::{register_call, RegisterCallRequest, RegisterCallResponse};
use crate::calls::retrieval::{get_call, CallResponse};
use crate::calls::session::{persist_session_end, SessionEvent, SessionSnapshot};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GetCallRequest {
    pub id: String,
}

/// POST /api/register-call
pub async fn handle_register_call(
    State(state): State<AppState>,
    Json(request): Json<RegisterCallRequest>,
) -> Result<Json<RegisterCallResponse>, AppError> {
    Ok(Json(register_call(&state, request).await?))
}

/// POST /api/get-call
pub async fn handle_get_call(
    State(state): State<AppState>,
    Json(request): Json<GetCallRequest>,
) -> Result<Json<CallResponse>, AppError> {
    Ok(Json(get_call(&state, &request.id).await?))
}

/// POST /api/calls/:call_id/events
///
/// The browser forwards each voice-SDK callback here.
pub async fn handle_session_event(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    Json(event): Json<SessionEvent>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let outcome = state
        .sessions
        .apply(&call_id, event)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No live session for call {call_id}")))?;

    if outcome.ended_now {
        persist_session_end(&state.db, &call_id, outcome.snapshot.tab_switch_count).await;
    }

    Ok(Json(outcome.snapshot))
}

/// GET /api/calls/:call_id/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .snapshot(&call_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No live session for call {call_id}")))
}
