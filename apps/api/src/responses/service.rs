use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::response::{CandidateStatus, ResponseRow};

const UNIQUE_EMAIL_INDEX: &str = "idx_response_interview_email";

#[derive(Debug, Clone, Deserialize)]
pub struct NewResponse {
    pub interview_id: String,
    pub call_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Partial update applied by `call_id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_ended: Option<bool>,
    pub is_viewed: Option<bool>,
    pub is_analysed: Option<bool>,
    pub tab_switch_count: Option<i32>,
    pub duration: Option<i32>,
    pub details: Option<Value>,
    pub analytics: Option<Value>,
}

/// Inserts the response, then bumps the interview's `response_count`.
/// The counter write is a separate statement; its failure is logged, not returned.
/// A second response from the same email to the same interview is a `Conflict`.
pub async fn create_response(pool: &PgPool, new: &NewResponse) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO response (interview_id, call_id, email, name)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&new.interview_id)
    .bind(&new.call_id)
    .bind(new.email.as_deref().map(|e| e.trim().to_lowercase()))
    .bind(new.name.as_deref().map(str::trim))
    .fetch_one(pool)
    .await
    .map_err(repeat_email_conflict)?;

    if let Err(e) = sqlx::query(
        "UPDATE interview SET response_count = response_count + 1 WHERE id = $1",
    )
    .bind(&new.interview_id)
    .execute(pool)
    .await
    {
        warn!(
            "Failed to update response count for interview {}: {e}",
            new.interview_id
        );
    }

    info!("Created response {id} for call {}", new.call_id);
    Ok(id)
}

fn repeat_email_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && db_err.constraint() == Some(UNIQUE_EMAIL_INDEX) =>
        {
            AppError::Conflict("You have already responded to this interview".to_string())
        }
        _ => AppError::from(err),
    }
}

pub async fn update_response(
    pool: &PgPool,
    call_id: &str,
    patch: &ResponsePatch,
) -> Result<ResponseRow, AppError> {
    sqlx::query_as::<_, ResponseRow>(
        r#"
        UPDATE response SET
            name             = COALESCE($2, name),
            email            = COALESCE($3, email),
            is_ended         = COALESCE($4, is_ended),
            is_viewed        = COALESCE($5, is_viewed),
            is_analysed      = COALESCE($6, is_analysed),
            tab_switch_count = COALESCE($7, tab_switch_count),
            duration         = COALESCE($8, duration),
            details          = COALESCE($9, details),
            analytics        = COALESCE($10, analytics)
        WHERE call_id = $1
        RETURNING *
        "#,
    )
    .bind(call_id)
    .bind(&patch.name)
    .bind(&patch.email)
    .bind(patch.is_ended)
    .bind(patch.is_viewed)
    .bind(patch.is_analysed)
    .bind(patch.tab_switch_count)
    .bind(patch.duration)
    .bind(&patch.details)
    .bind(&patch.analytics)
    .fetch_optional(pool)
    .await
    .map_err(repeat_email_conflict)?
    .ok_or_else(|| AppError::NotFound(format!("Response for call {call_id} not found")))
}

/// Saves the candidate-side end of a call.
pub async fn save_response(
    pool: &PgPool,
    call_id: &str,
    tab_switch_count: i32,
) -> Result<ResponseRow, AppError> {
    update_response(
        pool,
        call_id,
        &ResponsePatch {
            is_ended: Some(true),
            tab_switch_count: Some(tab_switch_count),
            ..Default::default()
        },
    )
    .await
}

/// Ended responses that are either not yet fetched from the voice provider or
/// already carry a call analysis, newest first.
pub async fn get_all_responses(
    pool: &PgPool,
    interview_id: &str,
) -> Result<Vec<ResponseRow>, AppError> {
    Ok(sqlx::query_as::<_, ResponseRow>(
        r#"
        SELECT * FROM response
        WHERE interview_id = $1
          AND is_ended
          AND (details IS NULL OR details->'call_analysis' IS NOT NULL)
        ORDER BY created_at DESC
        "#,
    )
    .bind(interview_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_response_by_call_id(
    pool: &PgPool,
    call_id: &str,
) -> Result<ResponseRow, AppError> {
    sqlx::query_as::<_, ResponseRow>("SELECT * FROM response WHERE call_id = $1")
        .bind(call_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Response for call {call_id} not found")))
}

/// Deletes the response, then lowers the interview's `response_count` (never below zero).
pub async fn delete_response(pool: &PgPool, call_id: &str) -> Result<(), AppError> {
    let interview_id: Option<String> =
        sqlx::query_scalar("DELETE FROM response WHERE call_id = $1 RETURNING interview_id")
            .bind(call_id)
            .fetch_optional(pool)
            .await?;

    let interview_id = interview_id
        .ok_or_else(|| AppError::NotFound(format!("Response for call {call_id} not found")))?;

    if let Err(e) = sqlx::query(
        "UPDATE interview SET response_count = GREATEST(response_count - 1, 0) WHERE id = $1",
    )
    .bind(&interview_id)
    .execute(pool)
    .await
    {
        warn!("Failed to update response count for interview {interview_id}: {e}");
    }

    info!("Deleted response for call {call_id}");
    Ok(())
}

pub async fn get_response_count_by_organization(
    pool: &PgPool,
    organization_id: &str,
) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT COUNT(r.id)
        FROM response r
        JOIN interview i ON i.id = r.interview_id
        WHERE i.organization_id = $1
        "#,
    )
    .bind(organization_id)
    .fetch_one(pool)
    .await?)
}

pub async fn get_all_emails(pool: &PgPool, interview_id: &str) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT email FROM response WHERE interview_id = $1 AND email IS NOT NULL",
    )
    .bind(interview_id)
    .fetch_all(pool)
    .await?)
}

pub async fn set_candidate_status(
    pool: &PgPool,
    call_id: &str,
    status: CandidateStatus,
) -> Result<ResponseRow, AppError> {
    sqlx::query_as::<_, ResponseRow>(
        "UPDATE response SET candidate_status = $2 WHERE call_id = $1 RETURNING *",
    )
    .bind(call_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Response for call {call_id} not found")))
}
