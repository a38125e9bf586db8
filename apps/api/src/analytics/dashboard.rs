//! Organization-wide dashboard aggregates.
//!
//! Each aggregate is a plain SELECT followed by counting in Rust; the counting
//! functions are pure so they can be tested without a database.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::feedback::FeedbackRow;
use crate::models::interview::InterviewRow;
use crate::models::response::ResponseRow;

/// Label used when a response has no candidate status.
pub const UNSPECIFIED_STATUS: &str = "Not specified";
const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewsByStatus {
    pub active: i64,
    pub archived: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_interviews: i64,
    pub total_responses: i64,
    pub average_duration: i64,
    pub average_satisfaction: f64,
    pub interviews_by_status: InterviewsByStatus,
    pub responses_by_date: BTreeMap<String, i64>,
    pub candidate_status_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopInterview {
    #[serde(flatten)]
    pub interview: InterviewRow,
    /// Counted from response rows, not the stored counter.
    pub actual_response_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub satisfaction: Option<i32>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackStats {
    pub satisfaction_counts: BTreeMap<i32, i64>,
    pub total_feedback_count: i64,
    pub feedback_data: Vec<FeedbackEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pure aggregation
// ────────────────────────────────────────────────────────────────────────────

/// Rounded mean of the given durations; 0 when there are none.
pub fn average_duration(durations: &[i32]) -> i64 {
    if durations.is_empty() {
        return 0;
    }
    let total: i64 = durations.iter().map(|&d| d as i64).sum();
    (total as f64 / durations.len() as f64).round() as i64
}

/// Mean rating rounded to one decimal; 0 when there are none.
pub fn average_satisfaction(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: i64 = ratings.iter().map(|&r| r as i64).sum();
    let mean = total as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Buckets timestamps by UTC calendar day (`YYYY-MM-DD`).
pub fn count_by_day(timestamps: &[DateTime<Utc>]) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for ts in timestamps {
        *counts.entry(ts.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
    }
    counts
}

/// Counts statuses; NULL or empty statuses are reported as `Not specified`.
pub fn count_statuses(statuses: &[Option<String>]) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        let key = status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNSPECIFIED_STATUS);
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Orders interviews by how many response rows reference them, most first.
/// Ties keep their original order.
pub fn rank_interviews(
    interviews: Vec<InterviewRow>,
    response_interview_ids: &[String],
    limit: usize,
) -> Vec<TopInterview> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for id in response_interview_ids {
        *counts.entry(id.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<TopInterview> = interviews
        .into_iter()
        .map(|interview| {
            let actual_response_count = counts.get(interview.id.as_str()).copied().unwrap_or(0);
            TopInterview {
                interview,
                actual_response_count,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.actual_response_count.cmp(&a.actual_response_count));
    ranked.truncate(limit);
    ranked
}

/// Per-rating counts with every rating 1–5 present, plus the rated total.
pub fn summarize_feedback(rows: &[FeedbackRow]) -> FeedbackStats {
    let mut satisfaction_counts: BTreeMap<i32, i64> = (1..=5).map(|r| (r, 0)).collect();
    let mut total_feedback_count = 0;

    for rating in rows.iter().filter_map(|r| r.satisfaction) {
        if let Some(count) = satisfaction_counts.get_mut(&rating) {
            *count += 1;
            total_feedback_count += 1;
        }
    }

    FeedbackStats {
        satisfaction_counts,
        total_feedback_count,
        feedback_data: rows
            .iter()
            .map(|r| FeedbackEntry {
                satisfaction: r.satisfaction,
                feedback: r.feedback.clone(),
            })
            .collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Queries
// ────────────────────────────────────────────────────────────────────────────

pub async fn get_dashboard_stats(pool: &PgPool) -> Result<DashboardStats, AppError> {
    let total_interviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interview")
        .fetch_one(pool)
        .await?;
    let total_responses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM response")
        .fetch_one(pool)
        .await?;
    let durations: Vec<i32> =
        sqlx::query_scalar("SELECT duration FROM response WHERE duration IS NOT NULL")
            .fetch_all(pool)
            .await?;
    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM interview WHERE is_active AND NOT is_archived",
    )
    .fetch_one(pool)
    .await?;
    let archived: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interview WHERE is_archived")
        .fetch_one(pool)
        .await?;
    let ratings: Vec<i32> =
        sqlx::query_scalar("SELECT satisfaction FROM feedback WHERE satisfaction IS NOT NULL")
            .fetch_all(pool)
            .await?;
    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let recent: Vec<DateTime<Utc>> =
        sqlx::query_scalar("SELECT created_at FROM response WHERE created_at >= $1")
            .bind(since)
            .fetch_all(pool)
            .await?;
    let statuses: Vec<Option<String>> = sqlx::query_scalar("SELECT candidate_status FROM response")
        .fetch_all(pool)
        .await?;

    Ok(DashboardStats {
        total_interviews,
        total_responses,
        average_duration: average_duration(&durations),
        average_satisfaction: average_satisfaction(&ratings),
        interviews_by_status: InterviewsByStatus { active, archived },
        responses_by_date: count_by_day(&recent),
        candidate_status_counts: count_statuses(&statuses),
    })
}

pub async fn get_recent_responses(pool: &PgPool, limit: i64) -> Result<Vec<ResponseRow>, AppError> {
    Ok(sqlx::query_as::<_, ResponseRow>(
        "SELECT * FROM response ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn get_top_interviews(pool: &PgPool, limit: usize) -> Result<Vec<TopInterview>, AppError> {
    let interviews = sqlx::query_as::<_, InterviewRow>("SELECT * FROM interview")
        .fetch_all(pool)
        .await?;
    let response_interview_ids: Vec<String> =
        sqlx::query_scalar("SELECT interview_id FROM response")
            .fetch_all(pool)
            .await?;
    Ok(rank_interviews(interviews, &response_interview_ids, limit))
}

pub async fn get_feedback_stats(pool: &PgPool) -> Result<FeedbackStats, AppError> {
    let rows = sqlx::query_as::<_, FeedbackRow>("SELECT * FROM feedback ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(summarize_feedback(&rows))
}
