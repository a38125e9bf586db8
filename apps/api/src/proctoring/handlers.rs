//! Axum route handlers for the Proctoring API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::proctoring::board::WarningBoard;
use crate::proctoring::detection::{evaluate_frame, Frame};
use crate::state::AppState;

const STOP_MESSAGE: &str = "🛑 Proctoring stopped and warnings cleared.";

#[derive(Serialize)]
pub struct FrameResult {
    pub warnings: Vec<String>,
    pub newly_raised: Vec<String>,
}

#[derive(Serialize)]
pub struct WarningsResponse {
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct StopResponse {
    pub message: String,
}

fn board(state: &AppState) -> WarningBoard {
    WarningBoard::new(state.redis.clone(), state.config.proctoring_ttl_secs)
}

/// POST /api/proctoring/:call_id/frames
pub async fn handle_submit_frame(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    Json(frame): Json<Frame>,
) -> Result<Json<FrameResult>, AppError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(AppError::Validation(
            "frame width and height must be positive".to_string(),
        ));
    }

    let warnings = evaluate_frame(&frame);
    let newly_raised = board(&state).publish(&call_id, &warnings).await?;
    if !newly_raised.is_empty() {
        info!("Call {call_id} raised proctoring warnings: {newly_raised:?}");
    }

    Ok(Json(FrameResult {
        warnings,
        newly_raised,
    }))
}

/// GET /api/proctoring/:call_id/warnings
pub async fn handle_get_warnings(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<WarningsResponse>, AppError> {
    Ok(Json(WarningsResponse {
        warnings: board(&state).current(&call_id).await?,
    }))
}

/// POST /api/proctoring/:call_id/stop
pub async fn handle_stop(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<StopResponse>, AppError> {
    board(&state).clear(&call_id).await?;
    info!("Proctoring stopped for call {call_id}");
    Ok(Json(StopResponse {
        message: STOP_MESSAGE.to_string(),
    }))
}
