//! Per-interview summary shown above the response table.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::interviews::service::get_interview;
use crate::models::response::{CandidateStatus, ResponseRow};
use crate::responses::service::get_all_responses;

const NO_SUMMARY: &str = "No summary available";
const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentCounts {
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionCounts {
    pub complete: i64,
    pub incomplete: i64,
    pub partial: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub call_id: String,
    pub name: String,
    pub overall_score: f64,
    pub communication_score: f64,
    pub call_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewSummary {
    pub interview_id: String,
    pub total_responses: i64,
    pub sentiment: SentimentCounts,
    pub call_completion: CompletionCounts,
    pub completed_count: i64,
    pub average_duration_secs: i64,
    /// `MM:SS`.
    pub average_duration: String,
    /// Percent, two decimals.
    pub completion_rate: f64,
    pub candidate_status_counts: BTreeMap<String, i64>,
    pub table: Vec<TableRow>,
}

fn call_analysis<'a>(response: &'a ResponseRow, key: &str) -> Option<&'a str> {
    response
        .details
        .as_ref()?
        .get("call_analysis")?
        .get(key)?
        .as_str()
}

fn analytics_number(analytics: Option<&Value>, path: &[&str]) -> f64 {
    let mut current = analytics;
    for key in path {
        current = current.and_then(|v| v.get(key));
    }
    current.and_then(Value::as_f64).unwrap_or(0.0)
}

pub fn format_mm_ss(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn table_row(response: &ResponseRow) -> TableRow {
    let analytics = response.analytics.as_ref();
    let call_summary = analytics
        .and_then(|a| a.get("softSkillSummary"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| call_analysis(response, "call_summary").filter(|s| !s.is_empty()))
        .unwrap_or(NO_SUMMARY)
        .to_string();

    TableRow {
        call_id: response.call_id.clone(),
        name: response
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        overall_score: analytics_number(analytics, &["overallScore"]),
        communication_score: analytics_number(analytics, &["communication", "score"]),
        call_summary,
    }
}

pub fn summarize(interview_id: &str, responses: &[ResponseRow]) -> InterviewSummary {
    let mut sentiment = SentimentCounts::default();
    let mut call_completion = CompletionCounts::default();
    let mut completed_count = 0;
    let mut total_duration: i64 = 0;
    let mut candidate_status_counts: BTreeMap<String, i64> = CandidateStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();

    for response in responses {
        match call_analysis(response, "user_sentiment") {
            Some("Positive") => sentiment.positive += 1,
            Some("Negative") => sentiment.negative += 1,
            Some("Neutral") => sentiment.neutral += 1,
            _ => {}
        }
        match call_analysis(response, "call_completion_rating") {
            Some("Complete") => call_completion.complete += 1,
            Some("Incomplete") => call_completion.incomplete += 1,
            Some("Partial") => call_completion.partial += 1,
            _ => {}
        }
        if matches!(
            call_analysis(response, "agent_task_completion_rating"),
            Some("Complete" | "Partial")
        ) {
            completed_count += 1;
        }
        total_duration += response.duration.unwrap_or(0) as i64;

        // Unknown labels fold into NO_STATUS
        let status = response
            .candidate_status
            .as_deref()
            .and_then(|s| s.parse::<CandidateStatus>().ok())
            .unwrap_or(CandidateStatus::NoStatus);
        *candidate_status_counts
            .entry(status.as_str().to_string())
            .or_insert(0) += 1;
    }

    let total = responses.len() as i64;
    let (average_duration_secs, completion_rate) = if total == 0 {
        (0, 0.0)
    } else {
        (
            (total_duration as f64 / total as f64).round() as i64,
            (completed_count as f64 / total as f64 * 10_000.0).round() / 100.0,
        )
    };

    InterviewSummary {
        interview_id: interview_id.to_string(),
        total_responses: total,
        sentiment,
        call_completion,
        completed_count,
        average_duration_secs,
        average_duration: format_mm_ss(average_duration_secs),
        completion_rate,
        candidate_status_counts,
        table: responses.iter().map(table_row).collect(),
    }
}

pub async fn get_interview_summary(
    pool: &PgPool,
    interview_id: &str,
) -> Result<InterviewSummary, AppError> {
    // unknown interviews are a 404
    get_interview(pool, interview_id).await?;
    let responses = get_all_responses(pool, interview_id).await?;
    Ok(summarize(interview_id, &responses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn response(call_id: &str, details: Option<Value>, status: Option<&str>) -> ResponseRow {
        ResponseRow {
            id: 1,
            created_at: Utc::now(),
            interview_id: "iv".to_string(),
            name: None,
            email: None,
            call_id: call_id.to_string(),
            candidate_status: status.map(str::to_string),
            duration: Some(90),
            details,
            analytics: None,
            is_analysed: false,
            is_ended: true,
            is_viewed: false,
            tab_switch_count: 0,
        }
    }

    fn analysis(sentiment: &str, completion: &str, task: &str) -> Option<Value> {
        Some(json!({
            "call_analysis": {
                "user_sentiment": sentiment,
                "call_completion_rating": completion,
                "agent_task_completion_rating": task,
                "call_summary": "Discussed ownership and lifetimes."
            }
        }))
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let summary = summarize("iv", &[]);
        assert_eq!(summary.total_responses, 0);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.average_duration, "00:00");
        assert_eq!(summary.candidate_status_counts.len(), 4);
        assert!(summary.table.is_empty());
    }

    #[test]
    fn test_counts_and_completion_rate() {
        let responses = vec![
            response("c1", analysis("Positive", "Complete", "Complete"), Some("SELECTED")),
            response("c2", analysis("Negative", "Partial", "Incomplete"), None),
            response("c3", analysis("Neutral", "Incomplete", "Partial"), Some("bogus")),
        ];
        let summary = summarize("iv", &responses);
        assert_eq!(
            summary.sentiment,
            SentimentCounts { positive: 1, negative: 1, neutral: 1 }
        );
        assert_eq!(
            summary.call_completion,
            CompletionCounts { complete: 1, incomplete: 1, partial: 1 }
        );
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.completion_rate, 66.67);
        assert_eq!(summary.average_duration, "01:30");
        assert_eq!(summary.candidate_status_counts["SELECTED"], 1);
        assert_eq!(summary.candidate_status_counts["NO_STATUS"], 2);
    }

    #[test]
    fn test_table_row_summary_fallbacks() {
        let mut with_analytics = response("c1", analysis("Positive", "Complete", "Complete"), None);
        with_analytics.name = Some("Ada".to_string());
        with_analytics.analytics = Some(json!({
            "overallScore": 81,
            "communication": {"score": 8},
            "softSkillSummary": "Confident and clear."
        }));
        let row = table_row(&with_analytics);
        assert_eq!(row.name, "Ada");
        assert_eq!(row.overall_score, 81.0);
        assert_eq!(row.communication_score, 8.0);
        assert_eq!(row.call_summary, "Confident and clear.");

        let from_call = table_row(&response("c2", analysis("Positive", "Complete", "Complete"), None));
        assert_eq!(from_call.name, "Anonymous");
        assert_eq!(from_call.call_summary, "Discussed ownership and lifetimes.");

        let bare = table_row(&response("c3", None, None));
        assert_eq!(bare.call_summary, "No summary available");
        assert_eq!(bare.overall_score, 0.0);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(605), "10:05");
    }
}
