// Recruiter analytics: dashboard aggregates, per-interview summaries and AI transcript
// analysis.

pub mod dashboard;
pub mod handlers;
pub mod insights;
pub mod prompts;
pub mod summary;
