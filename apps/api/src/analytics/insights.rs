use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::analytics::prompts::{INSIGHTS_PROMPT, INSIGHTS_SYSTEM};
use crate::errors::AppError;
use crate::interviews::service::get_interview;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::interview::Question;
use crate::responses::service::get_response_by_call_id;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsRequest {
    pub call_id: String,
    pub interview_id: String,
    /// Falls back to the transcript stored in the response details.
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Numbered, one per line: `1. First question`.
pub fn numbered_questions(questions: &[Question]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q.question))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(transcript: &str, questions: &[Question]) -> String {
    let questions = numbered_questions(questions);
    fill_template(
        INSIGHTS_PROMPT,
        &[("questions", questions.as_str()), ("transcript", transcript)],
    )
}

/// Adds the interview's main questions to the model output.
fn attach_questions(mut analytics: Value, questions: &[Question]) -> Value {
    if let Value::Object(map) = &mut analytics {
        map.insert(
            "mainInterviewQuestions".to_string(),
            Value::from(
                questions
                    .iter()
                    .map(|q| q.question.clone())
                    .collect::<Vec<_>>(),
            ),
        );
    }
    analytics
}

/// Analyses one call's transcript. Analytics already stored on the response are
/// returned as-is and the model is not called.
pub async fn generate_interview_analytics(
    pool: &PgPool,
    llm: &LlmClient,
    req: &AnalyticsRequest,
) -> Result<Value, AppError> {
    let response = get_response_by_call_id(pool, &req.call_id).await?;
    if let Some(cached) = response.analytics {
        return Ok(cached);
    }

    let interview = get_interview(pool, &req.interview_id).await?;

    let transcript = req
        .transcript
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            response
                .details
                .as_ref()
                .and_then(|d| d.get("transcript"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .ok_or_else(|| {
            AppError::Validation(format!("call {} has no transcript to analyse", req.call_id))
        })?;

    let questions = &interview.questions.0;
    if questions.is_empty() {
        warn!("Interview {} has no main questions", interview.id);
    }

    let prompt = build_prompt(&transcript, questions);
    let system = format!("{INSIGHTS_SYSTEM} {JSON_ONLY_SYSTEM}");

    let analytics: Value = llm
        .call_json(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Transcript analysis failed: {e}")))?;

    info!("Generated analytics for call {}", req.call_id);

    Ok(attach_questions(analytics, questions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn q(text: &str) -> Question {
        Question {
            id: text.to_string(),
            question: text.to_string(),
            follow_up_count: 1,
        }
    }

    #[test]
    fn test_numbered_questions() {
        let questions = vec![q("Tell me about yourself"), q("Why Rust?")];
        assert_eq!(
            numbered_questions(&questions),
            "1. Tell me about yourself\n2. Why Rust?"
        );
        assert_eq!(numbered_questions(&[]), "");
    }

    #[test]
    fn test_prompt_contains_transcript_and_questions() {
        let prompt = build_prompt("Agent: hi\nUser: hello", &[q("Why Rust?")]);
        assert!(prompt.contains("Transcript: Agent: hi\nUser: hello"));
        assert!(prompt.contains("1. Why Rust?"));
        assert!(!prompt.contains("{questions}"));
    }

    #[test]
    fn test_prompt_keeps_placeholders_inside_transcript() {
        let prompt = build_prompt("User: my notes say {questions}", &[q("Why Rust?")]);
        assert!(prompt.contains("User: my notes say {questions}"));
        assert_eq!(prompt.matches("1. Why Rust?").count(), 1);
    }

    #[test]
    fn test_attach_questions_extends_object() {
        let analytics = attach_questions(json!({"overallScore": 72}), &[q("A"), q("B")]);
        assert_eq!(analytics["overallScore"], 72);
        assert_eq!(analytics["mainInterviewQuestions"], json!(["A", "B"]));
    }

    #[test]
    fn test_attach_questions_leaves_non_objects() {
        assert_eq!(attach_questions(json!([1, 2]), &[q("A")]), json!([1, 2]));
    }
}
