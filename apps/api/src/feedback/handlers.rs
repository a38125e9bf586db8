use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::feedback::service::{submit_feedback, FeedbackSubmission};
use crate::models::feedback::FeedbackRow;
use crate::state::AppState;

/// POST /api/feedback
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    Json(submission): Json<FeedbackSubmission>,
) -> Result<(StatusCode, Json<FeedbackRow>), AppError> {
    let row = submit_feedback(&state.db, &submission).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
