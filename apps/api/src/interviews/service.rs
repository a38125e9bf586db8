use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::{InterviewRow, Question};

#[derive(Debug, Clone, Deserialize)]
pub struct NewInterview {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub objective: String,
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub interviewer_id: i64,
    #[serde(default)]
    pub is_anonymous: bool,
    pub logo_url: Option<String>,
    pub theme_color: Option<String>,
    pub questions: Vec<Question>,
    pub question_count: i32,
    pub time_duration: String,
    #[serde(default)]
    pub respondents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterviewRequest {
    pub organization_name: Option<String>,
    pub interview_data: NewInterview,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub is_active: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_anonymous: Option<bool>,
    pub theme_color: Option<String>,
    pub respondents: Option<Vec<String>>,
    pub questions: Option<Vec<Question>>,
    pub time_duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewListQuery {
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub interviewer_id: Option<i64>,
}

/// Checks a new interview before it is persisted.
pub fn validate_new_interview(data: &NewInterview) -> Result<(), AppError> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if data.question_count < 1 {
        return Err(AppError::Validation(
            "question_count must be at least 1".to_string(),
        ));
    }
    validate_questions(&data.questions, data.question_count)?;
    parse_duration_minutes(&data.time_duration)?;
    Ok(())
}

fn validate_questions(questions: &[Question], question_count: i32) -> Result<(), AppError> {
    if questions.is_empty() {
        return Err(AppError::Validation(
            "an interview needs at least one question".to_string(),
        ));
    }
    if questions.len() > question_count.max(0) as usize {
        return Err(AppError::Validation(format!(
            "{} questions exceed the configured question_count of {}",
            questions.len(),
            question_count
        )));
    }
    if let Some(blank) = questions.iter().position(|q| q.question.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "question {} is empty",
            blank + 1
        )));
    }
    Ok(())
}

/// Duration is whole minutes, stored as text.
pub fn parse_duration_minutes(raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(AppError::Validation(format!(
            "time_duration must be a positive number of minutes, got '{raw}'"
        ))),
    }
}

/// Lowercases, keeps ASCII alphanumerics, collapses everything else into single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

pub fn readable_slug(organization_name: Option<&str>, interview_name: &str) -> String {
    match organization_name.map(slugify).filter(|s| !s.is_empty()) {
        Some(org) => format!("{org}-{}", slugify(interview_name)),
        None => slugify(interview_name),
    }
}

pub fn normalize_emails(emails: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = emails
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

pub async fn create_interview(
    pool: &PgPool,
    base_url: &str,
    request: CreateInterviewRequest,
) -> Result<InterviewRow, AppError> {
    let data = request.interview_data;
    validate_new_interview(&data)?;

    let id = Uuid::new_v4().simple().to_string();
    let url = format!("{base_url}/call/{id}");
    let slug = readable_slug(request.organization_name.as_deref(), &data.name);
    let questions: Vec<Question> = data
        .questions
        .into_iter()
        .map(|q| Question {
            question: q.question.trim().to_string(),
            ..q
        })
        .collect();

    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interview
            (id, name, description, objective, organization_id, user_id, interviewer_id,
             is_anonymous, logo_url, theme_color, url, readable_slug, questions,
             question_count, time_duration, respondents)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.objective.trim())
    .bind(&data.organization_id)
    .bind(&data.user_id)
    .bind(data.interviewer_id)
    .bind(data.is_anonymous)
    .bind(&data.logo_url)
    .bind(&data.theme_color)
    .bind(&url)
    .bind(&slug)
    .bind(Json(&questions))
    .bind(data.question_count)
    .bind(data.time_duration.trim())
    .bind(normalize_emails(&data.respondents))
    .fetch_one(pool)
    .await?;

    info!("Created interview {id} ({slug})");
    Ok(row)
}

pub async fn get_interview(pool: &PgPool, id: &str) -> Result<InterviewRow, AppError> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interview WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

/// Interviews owned by the organization or created by the user, newest first.
pub async fn list_interviews(
    pool: &PgPool,
    query: &InterviewListQuery,
) -> Result<Vec<InterviewRow>, AppError> {
    if query.organization_id.is_none() && query.user_id.is_none() {
        return Err(AppError::Validation(
            "organization_id or user_id is required".to_string(),
        ));
    }

    Ok(sqlx::query_as::<_, InterviewRow>(
        r#"
        SELECT * FROM interview
        WHERE (organization_id = $1 OR user_id = $2)
          AND ($3::BIGINT IS NULL OR interviewer_id = $3)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&query.organization_id)
    .bind(&query.user_id)
    .bind(query.interviewer_id)
    .fetch_all(pool)
    .await?)
}

pub async fn update_interview(
    pool: &PgPool,
    id: &str,
    patch: InterviewPatch,
) -> Result<InterviewRow, AppError> {
    let current = get_interview(pool, id).await?;

    if let Some(questions) = &patch.questions {
        validate_questions(questions, current.question_count)?;
    }
    if let Some(duration) = &patch.time_duration {
        parse_duration_minutes(duration)?;
    }
    if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interview SET
            name          = COALESCE($2, name),
            description   = COALESCE($3, description),
            objective     = COALESCE($4, objective),
            is_active     = COALESCE($5, is_active),
            is_archived   = COALESCE($6, is_archived),
            is_anonymous  = COALESCE($7, is_anonymous),
            theme_color   = COALESCE($8, theme_color),
            respondents   = COALESCE($9, respondents),
            questions     = COALESCE($10, questions),
            time_duration = COALESCE($11, time_duration)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(&patch.description)
    .bind(&patch.objective)
    .bind(patch.is_active)
    .bind(patch.is_archived)
    .bind(patch.is_anonymous)
    .bind(&patch.theme_color)
    .bind(patch.respondents.as_deref().map(normalize_emails))
    .bind(patch.questions.map(Json))
    .bind(patch.time_duration.as_deref().map(str::trim))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn delete_interview(pool: &PgPool, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM interview WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Interview {id} not found")));
    }
    info!("Deleted interview {id}");
    Ok(())
}

/// Marks every interview of the organization inactive. Returns how many changed.
pub async fn deactivate_interviews_by_org(
    pool: &PgPool,
    organization_id: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE interview SET is_active = FALSE WHERE organization_id = $1 AND is_active",
    )
    .bind(organization_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> Question {
        Question {
            id: Uuid::new_v4().to_string(),
            question: text.to_string(),
            follow_up_count: 1,
        }
    }

    fn new_interview() -> NewInterview {
        NewInterview {
            name: "Backend Engineer Screen".to_string(),
            description: None,
            objective: "Assess API design experience".to_string(),
            organization_id: Some("org_1".to_string()),
            user_id: Some("user_1".to_string()),
            interviewer_id: 1,
            is_anonymous: false,
            logo_url: None,
            theme_color: None,
            questions: vec![question("Tell me about a service you designed.")],
            question_count: 2,
            time_duration: "10".to_string(),
            respondents: vec![],
        }
    }

    #[test]
    fn test_valid_interview_passes() {
        assert!(validate_new_interview(&new_interview()).is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut data = new_interview();
        data.name = "   ".to_string();
        assert!(matches!(
            validate_new_interview(&data),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_more_questions_than_count_rejected() {
        let mut data = new_interview();
        data.question_count = 1;
        data.questions.push(question("What trade-offs did you make?"));
        assert!(validate_new_interview(&data).is_err());
    }

    #[test]
    fn test_blank_question_rejected() {
        let mut data = new_interview();
        data.questions.push(question(" "));
        let err = validate_new_interview(&data).unwrap_err();
        assert!(err.to_string().contains("question 2 is empty"));
    }

    #[test]
    fn test_duration_must_be_positive_minutes() {
        assert_eq!(parse_duration_minutes(" 15 ").unwrap(), 15);
        assert!(parse_duration_minutes("0").is_err());
        assert!(parse_duration_minutes("ten").is_err());
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Acme, Inc. "), "acme-inc");
        assert_eq!(slugify("Senior  Rust/Go Engineer"), "senior-rust-go-engineer");
    }

    #[test]
    fn test_readable_slug_with_and_without_org() {
        assert_eq!(
            readable_slug(Some("Acme Corp"), "Data Analyst"),
            "acme-corp-data-analyst"
        );
        assert_eq!(readable_slug(None, "Data Analyst"), "data-analyst");
        assert_eq!(readable_slug(Some("!!!"), "Data Analyst"), "data-analyst");
    }

    #[test]
    fn test_normalize_emails_dedups_case_insensitively() {
        let emails = vec![
            "Ada@Example.com".to_string(),
            " ada@example.com".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_emails(&emails), vec!["ada@example.com"]);
    }
}
