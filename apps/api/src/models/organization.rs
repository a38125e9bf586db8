use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PLAN_FREE: &str = "free";
pub const PLAN_PRO: &str = "pro";
pub const PLAN_FREE_TRIAL_OVER: &str = "free_trial_over";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub plan: String,
    pub allowed_responses_count: i32,
}
