//! Axum route handlers for the Candidates API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::candidates::service::{
    get_candidate_stats, get_candidates_by_status, get_recent_candidates,
    get_top_candidate_statuses, CandidateStats, StatusCount,
};
use crate::errors::AppError;
use crate::models::response::{CandidateStatus, ResponseRow};
use crate::state::AppState;

const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

fn resolve_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

/// GET /api/candidates/stats
pub async fn handle_candidate_stats(
    State(state): State<AppState>,
) -> Result<Json<CandidateStats>, AppError> {
    Ok(Json(get_candidate_stats(&state.db).await?))
}

/// GET /api/candidates/recent?limit=10
pub async fn handle_recent_candidates(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ResponseRow>>, AppError> {
    Ok(Json(
        get_recent_candidates(&state.db, resolve_limit(query.limit, 10)).await?,
    ))
}

/// GET /api/candidates/status/:status?limit=20
pub async fn handle_candidates_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ResponseRow>>, AppError> {
    let status: CandidateStatus = status.parse().map_err(AppError::Validation)?;
    Ok(Json(
        get_candidates_by_status(&state.db, status, resolve_limit(query.limit, 20)).await?,
    ))
}

/// GET /api/candidates/top-statuses?limit=5
pub async fn handle_top_statuses(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<StatusCount>>, AppError> {
    let limit = resolve_limit(query.limit, 5) as usize;
    Ok(Json(get_top_candidate_statuses(&state.db, limit).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, 10), 10);
        assert_eq!(resolve_limit(Some(-3), 10), 1);
        assert_eq!(resolve_limit(Some(1_000), 20), 100);
    }
}
