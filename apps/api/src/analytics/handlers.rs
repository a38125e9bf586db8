//! Axum route handlers for the Analytics API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::analytics::dashboard::{
    get_dashboard_stats, get_feedback_stats, get_recent_responses, get_top_interviews,
    DashboardStats, FeedbackStats, TopInterview,
};
use crate::analytics::insights::{generate_interview_analytics, AnalyticsRequest};
use crate::analytics::summary::{get_interview_summary, InterviewSummary};
use crate::errors::AppError;
use crate::models::response::ResponseRow;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn resolve(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET /api/analytics/dashboard
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(get_dashboard_stats(&state.db).await?))
}

/// GET /api/analytics/recent-responses?limit=5
pub async fn handle_recent_responses(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ResponseRow>>, AppError> {
    Ok(Json(get_recent_responses(&state.db, query.resolve()).await?))
}

/// GET /api/analytics/top-interviews?limit=5
pub async fn handle_top_interviews(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TopInterview>>, AppError> {
    Ok(Json(
        get_top_interviews(&state.db, query.resolve() as usize).await?,
    ))
}

/// GET /api/analytics/feedback
pub async fn handle_feedback_stats(
    State(state): State<AppState>,
) -> Result<Json<FeedbackStats>, AppError> {
    Ok(Json(get_feedback_stats(&state.db).await?))
}

/// POST /api/analytics/interview
pub async fn handle_generate_analytics(
    State(state): State<AppState>,
    Json(req): Json<AnalyticsRequest>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(
        generate_interview_analytics(&state.db, &state.llm, &req).await?,
    ))
}

/// GET /api/interviews/:id/summary
pub async fn handle_interview_summary(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<Json<InterviewSummary>, AppError> {
    Ok(Json(get_interview_summary(&state.db, &interview_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(LimitQuery { limit: None }.resolve(), 5);
        assert_eq!(LimitQuery { limit: Some(0) }.resolve(), 1);
        assert_eq!(LimitQuery { limit: Some(500) }.resolve(), 100);
    }
}
