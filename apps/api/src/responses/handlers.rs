//! Axum route handlers for the Responses API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::response::{CandidateStatus, ResponseRow};
use crate::responses::service::{
    delete_response, get_all_emails, get_all_responses, get_response_by_call_id,
    set_candidate_status, update_response, ResponsePatch,
};
use crate::responses::transcript::format_transcript;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CandidateStatusUpdate {
    pub candidate_status: String,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub call_id: String,
    pub transcript: String,
}

/// GET /api/interviews/:id/responses
pub async fn handle_list_responses(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<Json<Vec<ResponseRow>>, AppError> {
    Ok(Json(get_all_responses(&state.db, &interview_id).await?))
}

/// GET /api/interviews/:id/emails
pub async fn handle_list_emails(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(get_all_emails(&state.db, &interview_id).await?))
}

/// GET /api/responses/:call_id
pub async fn handle_get_response(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<ResponseRow>, AppError> {
    Ok(Json(get_response_by_call_id(&state.db, &call_id).await?))
}

/// PATCH /api/responses/:call_id
pub async fn handle_update_response(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    Json(patch): Json<ResponsePatch>,
) -> Result<Json<ResponseRow>, AppError> {
    Ok(Json(update_response(&state.db, &call_id, &patch).await?))
}

/// DELETE /api/responses/:call_id
pub async fn handle_delete_response(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<StatusCode, AppError> {
    delete_response(&state.db, &call_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/responses/:call_id/status
pub async fn handle_set_candidate_status(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    Json(update): Json<CandidateStatusUpdate>,
) -> Result<Json<ResponseRow>, AppError> {
    let status: CandidateStatus = update
        .candidate_status
        .parse()
        .map_err(AppError::Validation)?;
    Ok(Json(set_candidate_status(&state.db, &call_id, status).await?))
}

/// GET /api/responses/:call_id/transcript
///
/// Display-ready transcript. Requires the call to have been fetched via `get-call` first.
pub async fn handle_get_transcript(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let response = get_response_by_call_id(&state.db, &call_id).await?;
    let raw = response
        .details
        .as_ref()
        .and_then(|d| d.get("transcript"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| AppError::NotFound(format!("No transcript stored for call {call_id}")))?;
    let name = response.name.as_deref().unwrap_or("Candidate");

    Ok(Json(TranscriptResponse {
        transcript: format_transcript(raw, name),
        call_id,
    }))
}
