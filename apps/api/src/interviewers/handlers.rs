//! Axum route handlers for the Interviewers API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::interviewers::service::{
    create_interviewer, create_preset_interviewers, get_interviewer, list_interviewers,
    NewInterviewer,
};
use crate::models::interviewer::InterviewerRow;
use crate::state::AppState;

/// GET /api/interviewers
pub async fn handle_list_interviewers(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewerRow>>, AppError> {
    Ok(Json(list_interviewers(&state.db).await?))
}

/// GET /api/interviewers/:id
pub async fn handle_get_interviewer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InterviewerRow>, AppError> {
    Ok(Json(get_interviewer(&state.db, id).await?))
}

/// POST /api/interviewers
pub async fn handle_create_interviewer(
    State(state): State<AppState>,
    Json(data): Json<NewInterviewer>,
) -> Result<(StatusCode, Json<InterviewerRow>), AppError> {
    let row = create_interviewer(&state.db, &state.voice, &data).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/interviewers/presets
pub async fn handle_create_presets(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<InterviewerRow>>), AppError> {
    let rows = create_preset_interviewers(&state.db, &state.voice).await?;
    Ok((StatusCode::CREATED, Json(rows)))
}
