use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::analytics::dashboard::{average_duration, count_statuses};
use crate::errors::AppError;
use crate::models::response::{CandidateStatus, ResponseRow};

const UNKNOWN_DOMAIN: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
pub struct CandidateStats {
    pub total_candidates: i64,
    pub status_counts: BTreeMap<String, i64>,
    pub average_duration: i64,
    pub domain_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Domain part of each address. NULL emails are skipped.
pub fn count_domains(emails: &[Option<String>]) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for email in emails.iter().flatten() {
        let domain = email
            .split('@')
            .nth(1)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNKNOWN_DOMAIN);
        *counts.entry(domain.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Status counts sorted by count, highest first.
pub fn top_statuses(statuses: &[Option<String>], limit: usize) -> Vec<StatusCount> {
    let mut ranked: Vec<StatusCount> = count_statuses(statuses)
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

pub async fn get_candidate_stats(pool: &PgPool) -> Result<CandidateStats, AppError> {
    let total_candidates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM response")
        .fetch_one(pool)
        .await?;
    let statuses: Vec<Option<String>> = sqlx::query_scalar("SELECT candidate_status FROM response")
        .fetch_all(pool)
        .await?;
    let durations: Vec<i32> =
        sqlx::query_scalar("SELECT duration FROM response WHERE duration IS NOT NULL")
            .fetch_all(pool)
            .await?;
    let emails: Vec<Option<String>> = sqlx::query_scalar("SELECT email FROM response")
        .fetch_all(pool)
        .await?;

    Ok(CandidateStats {
        total_candidates,
        status_counts: count_statuses(&statuses),
        average_duration: average_duration(&durations),
        domain_counts: count_domains(&emails),
    })
}

pub async fn get_recent_candidates(pool: &PgPool, limit: i64) -> Result<Vec<ResponseRow>, AppError> {
    Ok(sqlx::query_as::<_, ResponseRow>(
        "SELECT * FROM response ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn get_candidates_by_status(
    pool: &PgPool,
    status: CandidateStatus,
    limit: i64,
) -> Result<Vec<ResponseRow>, AppError> {
    Ok(sqlx::query_as::<_, ResponseRow>(
        r#"
        SELECT * FROM response
        WHERE candidate_status = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(status.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn get_top_candidate_statuses(
    pool: &PgPool,
    limit: usize,
) -> Result<Vec<StatusCount>, AppError> {
    let statuses: Vec<Option<String>> = sqlx::query_scalar("SELECT candidate_status FROM response")
        .fetch_all(pool)
        .await?;
    Ok(top_statuses(&statuses, limit))
}
