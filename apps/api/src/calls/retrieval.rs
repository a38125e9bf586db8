//! Post-call retrieval: pulls the finished call from the voice provider once, derives its
//! duration, runs transcript analysis and caches all of it on the response row.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::analytics::insights::{generate_interview_analytics, AnalyticsRequest};
use crate::errors::AppError;
use crate::responses::service::{get_response_by_call_id, update_response, ResponsePatch};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub call_response: Value,
    pub analytics: Option<Value>,
}

/// Call length in whole seconds from the provider's millisecond timestamps.
/// `None` while the call has no end timestamp.
pub fn call_duration_secs(details: &Value) -> Option<i32> {
    let start = details.get("start_timestamp")?.as_f64()?;
    let end = details.get("end_timestamp")?.as_f64()?;
    Some((end / 1000.0 - start / 1000.0).round().max(0.0) as i32)
}

fn transcript_of(details: &Value) -> Option<&str> {
    details
        .get("transcript")
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
}

pub async fn get_call(state: &AppState, call_id: &str) -> Result<CallResponse, AppError> {
    let response = get_response_by_call_id(&state.db, call_id).await?;

    if response.is_analysed {
        if let Some(details) = response.details {
            return Ok(CallResponse {
                call_response: details,
                analytics: response.analytics,
            });
        }
    }

    let details = state
        .voice
        .get_call(call_id)
        .await
        .map_err(|e| AppError::Voice(format!("Failed to fetch call {call_id}: {e}")))?;

    let duration = call_duration_secs(&details);
    let analytics = match (duration, transcript_of(&details)) {
        (Some(_), Some(transcript)) => Some(
            generate_interview_analytics(
                &state.db,
                &state.llm,
                &AnalyticsRequest {
                    call_id: call_id.to_string(),
                    interview_id: response.interview_id.clone(),
                    transcript: Some(transcript.to_string()),
                },
            )
            .await?,
        ),
        _ => None,
    };

    update_response(
        &state.db,
        call_id,
        &ResponsePatch {
            details: Some(details.clone()),
            duration,
            is_analysed: Some(analytics.is_some()),
            analytics: analytics.clone(),
            ..Default::default()
        },
    )
    .await?;

    info!(
        "Fetched call {call_id} (analysed: {})",
        analytics.is_some()
    );

    Ok(CallResponse {
        call_response: details,
        analytics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duration_rounds_to_seconds() {
        let details = json!({"start_timestamp": 1_700_000_000_000i64, "end_timestamp": 1_700_000_125_600i64});
        assert_eq!(call_duration_secs(&details), Some(126));
    }

    #[test]
    fn test_duration_missing_until_call_ends() {
        let details = json!({"start_timestamp": 1_700_000_000_000i64});
        assert_eq!(call_duration_secs(&details), None);
    }

    #[test]
    fn test_blank_transcript_is_ignored() {
        assert_eq!(transcript_of(&json!({"transcript": "  "})), None);
        assert_eq!(
            transcript_of(&json!({"transcript": "Agent: Hi"})),
            Some("Agent: Hi")
        );
    }
}
