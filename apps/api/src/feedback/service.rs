use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::feedback::FeedbackRow;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSubmission {
    pub interview_id: String,
    pub email: Option<String>,
    pub feedback: Option<String>,
    /// 1 (worst) to 5 (best).
    pub satisfaction: Option<i32>,
}

pub fn validate_submission(submission: &FeedbackSubmission) -> Result<(), AppError> {
    if submission.interview_id.trim().is_empty() {
        return Err(AppError::Validation("interview_id cannot be empty".to_string()));
    }
    if let Some(rating) = submission.satisfaction {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "satisfaction must be between 1 and 5".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn submit_feedback(
    pool: &PgPool,
    submission: &FeedbackSubmission,
) -> Result<FeedbackRow, AppError> {
    validate_submission(submission)?;

    let feedback = submission
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());
    let email = submission
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    let row = sqlx::query_as::<_, FeedbackRow>(
        r#"
        INSERT INTO feedback (interview_id, email, feedback, satisfaction)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&submission.interview_id)
    .bind(email)
    .bind(feedback)
    .bind(submission.satisfaction)
    .fetch_one(pool)
    .await?;

    info!("Recorded feedback {} for interview {}", row.id, submission.interview_id);
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(satisfaction: Option<i32>) -> FeedbackSubmission {
        FeedbackSubmission {
            interview_id: "iv-1".to_string(),
            email: None,
            feedback: Some("Great pacing".to_string()),
            satisfaction,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_submission(&submission(Some(1))).is_ok());
        assert!(validate_submission(&submission(Some(5))).is_ok());
        assert!(validate_submission(&submission(None)).is_ok());
        assert!(validate_submission(&submission(Some(0))).is_err());
        assert!(validate_submission(&submission(Some(6))).is_err());
    }

    #[test]
    fn test_interview_id_required() {
        let mut s = submission(Some(3));
        s.interview_id = "  ".to_string();
        assert!(matches!(validate_submission(&s), Err(AppError::Validation(_))));
    }
}
