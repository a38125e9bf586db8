use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub interview_id: Option<String>,
    pub email: Option<String>,
    pub feedback: Option<String>,
    pub satisfaction: Option<i32>,
}
