use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewerRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub audio: Option<String>,
    pub empathy: i32,
    pub exploration: i32,
    pub rapport: i32,
    pub speed: i32,
}
