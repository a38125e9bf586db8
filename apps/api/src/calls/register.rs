//! Call registration: decides whether a candidate may start the interview, then
//! registers a web call with the interviewer's voice agent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::info;

use crate::calls::session::CallSession;
use crate::errors::AppError;
use crate::interviewers::service::get_interviewer;
use crate::interviews::service::get_interview;
use crate::models::interview::InterviewRow;
use crate::models::organization::PLAN_FREE_TRIAL_OVER;
use crate::organizations::service::find_organization;
use crate::responses::service::{create_response, get_all_emails, NewResponse};
use crate::state::AppState;

const ANONYMOUS_NAME: &str = "not provided";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCallRequest {
    pub interview_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterCallResponse {
    pub call_id: String,
    pub access_token: String,
}

/// RFC 5322 address as parsed by lettre, additionally requiring a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Ok(address) = email.parse::<lettre::Address>() else {
        return false;
    };
    let domain = address.domain();
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Decides whether a candidate may take the interview.
/// Returns the normalized email to store, if any.
pub fn check_eligibility(
    interview: &InterviewRow,
    organization_plan: Option<&str>,
    email: Option<&str>,
    previous_emails: &[String],
) -> Result<Option<String>, AppError> {
    if !interview.is_active || interview.is_archived {
        return Err(AppError::Forbidden(
            "This interview is no longer accepting responses".to_string(),
        ));
    }
    if organization_plan == Some(PLAN_FREE_TRIAL_OVER) {
        return Err(AppError::Forbidden(
            "This organization has reached its response limit".to_string(),
        ));
    }

    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    let Some(email) = email else {
        if interview.is_anonymous {
            return Ok(None);
        }
        return Err(AppError::Validation("email is required".to_string()));
    };

    if !is_valid_email(&email) {
        return Err(AppError::Validation(format!("'{email}' is not a valid email")));
    }
    if previous_emails
        .iter()
        .any(|previous| previous.trim().eq_ignore_ascii_case(&email))
    {
        return Err(AppError::Conflict(
            "You have already responded to this interview".to_string(),
        ));
    }
    if !interview.respondents.is_empty()
        && !interview
            .respondents
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&email))
    {
        return Err(AppError::Forbidden(
            "This email is not on the interview's respondent list".to_string(),
        ));
    }

    Ok(Some(email))
}

/// Variables substituted into the interviewer agent's prompt.
pub fn dynamic_variables(interview: &InterviewRow, name: Option<&str>) -> HashMap<String, String> {
    let questions = interview
        .questions
        .iter()
        .map(|q| q.question.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(ANONYMOUS_NAME);

    HashMap::from([
        ("mins".to_string(), interview.time_duration.clone()),
        ("objective".to_string(), interview.objective.clone()),
        ("questions".to_string(), questions),
        ("name".to_string(), name.to_string()),
    ])
}

pub async fn register_call(
    state: &AppState,
    request: RegisterCallRequest,
) -> Result<RegisterCallResponse, AppError> {
    let interview = get_interview(&state.db, &request.interview_id).await?;

    let organization_plan = match &interview.organization_id {
        Some(org_id) => find_organization(&state.db, org_id).await?.map(|o| o.plan),
        None => None,
    };
    let previous_emails = get_all_emails(&state.db, &interview.id).await?;
    let email = check_eligibility(
        &interview,
        organization_plan.as_deref(),
        request.email.as_deref(),
        &previous_emails,
    )?;

    let interviewer = get_interviewer(&state.db, interview.interviewer_id).await?;
    let variables = dynamic_variables(&interview, request.name.as_deref());
    let web_call = state
        .voice
        .create_web_call(&interviewer.agent_id, &variables)
        .await
        .map_err(|e| AppError::Voice(format!("Failed to register call: {e}")))?;

    create_response(
        &state.db,
        &NewResponse {
            interview_id: interview.id.clone(),
            call_id: web_call.call_id.clone(),
            email,
            name: request.name.clone(),
        },
    )
    .await?;

    state
        .sessions
        .open(CallSession::started(
            web_call.call_id.clone(),
            interview.id.clone(),
            interview.duration_minutes(),
            Instant::now(),
        ))
        .await;

    info!(
        "Registered call {} for interview {}",
        web_call.call_id, interview.id
    );

    Ok(RegisterCallResponse {
        call_id: web_call.call_id,
        access_token: web_call.access_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::Question;
    use chrono::Utc;
    use serde_json::json;
    use sqlx::types::Json;

    fn interview() -> InterviewRow {
        InterviewRow {
            id: "iv_1".to_string(),
            created_at: Utc::now(),
            name: "Data Analyst".to_string(),
            description: None,
            objective: "SQL depth".to_string(),
            organization_id: Some("org_1".to_string()),
            user_id: None,
            interviewer_id: 1,
            is_active: true,
            is_anonymous: false,
            is_archived: false,
            logo_url: None,
            theme_color: None,
            url: None,
            readable_slug: None,
            questions: Json(vec![
                Question {
                    id: "q1".to_string(),
                    question: "What is a window function?".to_string(),
                    follow_up_count: 1,
                },
                Question {
                    id: "q2".to_string(),
                    question: "How do you tune a slow query?".to_string(),
                    follow_up_count: 1,
                },
            ]),
            quotes: json!([]),
            insights: vec![],
            respondents: vec![],
            question_count: 2,
            response_count: 0,
            time_duration: "15".to_string(),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada @example.com"));
        assert!(!is_valid_email("ada@example.com."));
    }

    #[test]
    fn test_email_validation_rejects_header_metacharacters() {
        assert!(!is_valid_email("a<b>@x.io"));
        assert!(!is_valid_email("a\"b@x.io"));
        assert!(!is_valid_email("ada@exa,mple.com"));
        assert!(!is_valid_email("a(b)@x.io"));
        assert!(matches!(
            check_eligibility(&interview(), None, Some("a<b>@x.io"), &[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_new_candidate_is_eligible_and_normalized() {
        let email = check_eligibility(&interview(), Some("free"), Some(" Ada@Example.com "), &[]);
        assert_eq!(email.unwrap(), Some("ada@example.com".to_string()));
    }

    #[test]
    fn test_repeat_candidate_rejected() {
        let previous = vec!["ADA@example.com".to_string()];
        let result = check_eligibility(&interview(), None, Some("ada@example.com"), &previous);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_respondent_list_restricts_access() {
        let mut iv = interview();
        iv.respondents = vec!["grace@example.com".to_string()];
        assert!(matches!(
            check_eligibility(&iv, None, Some("ada@example.com"), &[]),
            Err(AppError::Forbidden(_))
        ));
        assert!(check_eligibility(&iv, None, Some("Grace@example.com"), &[]).is_ok());
    }

    #[test]
    fn test_inactive_interview_rejected() {
        let mut iv = interview();
        iv.is_active = false;
        assert!(matches!(
            check_eligibility(&iv, None, Some("ada@example.com"), &[]),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_exhausted_plan_rejected() {
        assert!(matches!(
            check_eligibility(&interview(), Some("free_trial_over"), Some("ada@example.com"), &[]),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_email_required_unless_anonymous() {
        assert!(matches!(
            check_eligibility(&interview(), None, None, &[]),
            Err(AppError::Validation(_))
        ));
        let mut iv = interview();
        iv.is_anonymous = true;
        assert_eq!(check_eligibility(&iv, None, Some("  "), &[]).unwrap(), None);
    }

    #[test]
    fn test_dynamic_variables() {
        let vars = dynamic_variables(&interview(), None);
        assert_eq!(vars["mins"], "15");
        assert_eq!(vars["objective"], "SQL depth");
        assert_eq!(
            vars["questions"],
            "What is a window function?, How do you tune a slow query?"
        );
        assert_eq!(vars["name"], "not provided");
        assert_eq!(dynamic_variables(&interview(), Some(" Ada "))["name"], "Ada");
    }
}
