use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub follow_up_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub objective: String,
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub interviewer_id: i64,
    pub is_active: bool,
    pub is_anonymous: bool,
    pub is_archived: bool,
    pub logo_url: Option<String>,
    pub theme_color: Option<String>,
    pub url: Option<String>,
    pub readable_slug: Option<String>,
    pub questions: Json<Vec<Question>>,
    pub quotes: Value,
    pub insights: Vec<String>,
    pub respondents: Vec<String>,
    pub question_count: i32,
    pub response_count: i64,
    /// Minutes, stored as text.
    pub time_duration: String,
}

impl InterviewRow {
    /// Interview length in minutes; unparsable values fall back to one minute.
    pub fn duration_minutes(&self) -> u64 {
        self.time_duration.trim().parse::<u64>().unwrap_or(1)
    }
}
