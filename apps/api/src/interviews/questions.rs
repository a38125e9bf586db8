use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::prompts::{QUESTION_GENERATION_PROMPT, QUESTION_GENERATION_SYSTEM};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::LlmClient;
use crate::models::interview::Question;

pub const MAX_GENERATED_QUESTIONS: u32 = 20;
const DEFAULT_FOLLOW_UP_COUNT: i32 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub name: String,
    pub objective: String,
    pub number: u32,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<Question>,
    pub description: String,
}

/// Raw model output shape.
#[derive(Debug, Deserialize)]
struct GeneratedQuestions {
    questions: Vec<GeneratedQuestion>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
}

fn validate_request(request: &GenerateQuestionsRequest) -> Result<(), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if request.objective.trim().is_empty() {
        return Err(AppError::Validation("objective cannot be empty".to_string()));
    }
    if request.number == 0 || request.number > MAX_GENERATED_QUESTIONS {
        return Err(AppError::Validation(format!(
            "number must be between 1 and {MAX_GENERATED_QUESTIONS}"
        )));
    }
    Ok(())
}

fn build_prompt(request: &GenerateQuestionsRequest) -> String {
    let context = if request.context.trim().is_empty() {
        "(no additional context provided)"
    } else {
        request.context.trim()
    };
    let number = request.number.to_string();
    fill_template(
        QUESTION_GENERATION_PROMPT,
        &[
            ("name", request.name.trim()),
            ("objective", request.objective.trim()),
            ("number", number.as_str()),
            ("context", context),
        ],
    )
}

/// Turns model output into stored questions: trims, drops blanks, caps at the requested count.
fn into_questions(generated: GeneratedQuestions, limit: u32) -> GenerateQuestionsResponse {
    let questions = generated
        .questions
        .into_iter()
        .map(|q| q.question.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(limit as usize)
        .map(|question| Question {
            id: Uuid::new_v4().to_string(),
            question,
            follow_up_count: DEFAULT_FOLLOW_UP_COUNT,
        })
        .collect();

    GenerateQuestionsResponse {
        questions,
        description: generated.description.trim().to_string(),
    }
}

pub async fn generate_questions(
    llm: &LlmClient,
    request: &GenerateQuestionsRequest,
) -> Result<GenerateQuestionsResponse, AppError> {
    validate_request(request)?;

    let prompt = build_prompt(request);
    let generated: GeneratedQuestions = llm
        .call_json(&prompt, QUESTION_GENERATION_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to generate interview questions: {e}")))?;

    let response = into_questions(generated, request.number);
    if response.questions.is_empty() {
        return Err(AppError::Llm("Model returned no usable questions".to_string()));
    }

    info!(
        "Generated {} questions for interview '{}'",
        response.questions.len(),
        request.name.trim()
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(number: u32) -> GenerateQuestionsRequest {
        GenerateQuestionsRequest {
            name: "Frontend Engineer".to_string(),
            objective: "Find someone comfortable with React performance work".to_string(),
            number,
            context: String::new(),
        }
    }

    #[test]
    fn test_number_bounds() {
        assert!(validate_request(&request(0)).is_err());
        assert!(validate_request(&request(1)).is_ok());
        assert!(validate_request(&request(MAX_GENERATED_QUESTIONS)).is_ok());
        assert!(validate_request(&request(MAX_GENERATED_QUESTIONS + 1)).is_err());
    }

    #[test]
    fn test_prompt_fills_placeholders() {
        let prompt = build_prompt(&request(3));
        assert!(prompt.contains("Interview Title: Frontend Engineer"));
        assert!(prompt.contains("Number of questions to be generated: 3"));
        assert!(prompt.contains("(no additional context provided)"));
        assert!(!prompt.contains("{objective}"));
    }

    #[test]
    fn test_prompt_keeps_placeholders_typed_by_user() {
        let mut req = request(3);
        req.objective = "Check {context} handling".to_string();
        req.context = "Team uses Next.js".to_string();
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Check {context} handling"));
        assert_eq!(prompt.matches("Team uses Next.js").count(), 1);
    }

    #[test]
    fn test_into_questions_trims_filters_and_caps() {
        let generated: GeneratedQuestions = serde_json::from_str(
            r#"{
                "questions": [
                    {"question": "  How do you profile renders? "},
                    {"question": ""},
                    {"question": "Describe a memoization bug."},
                    {"question": "What is hydration?"}
                ],
                "description": " You will discuss frontend performance. "
            }"#,
        )
        .unwrap();

        let response = into_questions(generated, 2);
        assert_eq!(response.questions.len(), 2);
        assert_eq!(response.questions[0].question, "How do you profile renders?");
        assert_eq!(response.questions[1].question, "Describe a memoization bug.");
        assert!(response.questions.iter().all(|q| q.follow_up_count == 1));
        assert_eq!(response.description, "You will discuss frontend performance.");
    }
}
