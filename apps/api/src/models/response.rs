use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResponseRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub interview_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub call_id: String,
    pub candidate_status: Option<String>,
    /// Seconds.
    pub duration: Option<i32>,
    pub details: Option<Value>,
    pub analytics: Option<Value>,
    pub is_analysed: bool,
    pub is_ended: bool,
    pub is_viewed: bool,
    pub tab_switch_count: i32,
}

/// Recruiter-assigned label on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateStatus {
    NoStatus,
    NotSelected,
    Potential,
    Selected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 4] = [
        CandidateStatus::NoStatus,
        CandidateStatus::NotSelected,
        CandidateStatus::Potential,
        CandidateStatus::Selected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::NoStatus => "NO_STATUS",
            CandidateStatus::NotSelected => "NOT_SELECTED",
            CandidateStatus::Potential => "POTENTIAL",
            CandidateStatus::Selected => "SELECTED",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CandidateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown candidate status '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in CandidateStatus::ALL {
            assert_eq!(status.as_str().parse::<CandidateStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("HIRED".parse::<CandidateStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&CandidateStatus::NotSelected).unwrap();
        assert_eq!(json, "\"NOT_SELECTED\"");
    }
}
