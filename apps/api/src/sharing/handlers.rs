use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::sharing::service::{send_invitations, ShareReport, ShareRequest};
use crate::state::AppState;

/// POST /api/interviews/:id/share
pub async fn handle_share_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Json(request): Json<ShareRequest>,
) -> Result<Json<ShareReport>, AppError> {
    let report = send_invitations(
        &state.db,
        state.mailer.clone(),
        &state.config.base_url,
        &interview_id,
        &request,
    )
    .await?;
    Ok(Json(report))
}
