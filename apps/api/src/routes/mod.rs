pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::analytics::handlers as analytics;
use crate::calls::handlers as calls;
use crate::candidates::handlers as candidates;
use crate::feedback::handlers as feedback;
use crate::interviewers::handlers as interviewers;
use crate::interviews::documents::MAX_DOCUMENT_BYTES;
use crate::interviews::handlers as interviews;
use crate::organizations::handlers as organizations;
use crate::proctoring::handlers as proctoring;
use crate::responses::handlers as responses;
use crate::sharing::handlers as sharing;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interviews
        .route(
            "/api/interviews",
            get(interviews::handle_list_interviews).post(interviews::handle_create_interview),
        )
        .route(
            "/api/interviews/generate-questions",
            post(interviews::handle_generate_questions),
        )
        .route(
            "/api/interviews/context-document",
            post(interviews::handle_upload_context_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES)),
        )
        .route(
            "/api/interviews/:id",
            get(interviews::handle_get_interview)
                .patch(interviews::handle_update_interview)
                .delete(interviews::handle_delete_interview),
        )
        .route(
            "/api/interviews/:id/responses",
            get(responses::handle_list_responses),
        )
        .route("/api/interviews/:id/emails", get(responses::handle_list_emails))
        .route(
            "/api/interviews/:id/summary",
            get(analytics::handle_interview_summary),
        )
        .route("/api/interviews/:id/share", post(sharing::handle_share_interview))
        // Interviewers
        .route(
            "/api/interviewers",
            get(interviewers::handle_list_interviewers).post(interviewers::handle_create_interviewer),
        )
        .route(
            "/api/interviewers/presets",
            post(interviewers::handle_create_presets),
        )
        .route("/api/interviewers/:id", get(interviewers::handle_get_interviewer))
        // Calls
        .route("/api/register-call", post(calls::handle_register_call))
        .route("/api/get-call", post(calls::handle_get_call))
        .route("/api/calls/:call_id/events", post(calls::handle_session_event))
        .route("/api/calls/:call_id/session", get(calls::handle_get_session))
        // Responses
        .route(
            "/api/responses/:call_id",
            get(responses::handle_get_response)
                .patch(responses::handle_update_response)
                .delete(responses::handle_delete_response),
        )
        .route(
            "/api/responses/:call_id/status",
            patch(responses::handle_set_candidate_status),
        )
        .route(
            "/api/responses/:call_id/transcript",
            get(responses::handle_get_transcript),
        )
        // Proctoring
        .route("/api/proctoring/health", get(health::health_handler))
        .route(
            "/api/proctoring/:call_id/frames",
            post(proctoring::handle_submit_frame),
        )
        .route(
            "/api/proctoring/:call_id/warnings",
            get(proctoring::handle_get_warnings),
        )
        .route("/api/proctoring/:call_id/stop", post(proctoring::handle_stop))
        // Analytics
        .route("/api/analytics/dashboard", get(analytics::handle_dashboard_stats))
        .route(
            "/api/analytics/recent-responses",
            get(analytics::handle_recent_responses),
        )
        .route(
            "/api/analytics/top-interviews",
            get(analytics::handle_top_interviews),
        )
        .route("/api/analytics/feedback", get(analytics::handle_feedback_stats))
        .route(
            "/api/analytics/interview",
            post(analytics::handle_generate_analytics),
        )
        // Candidates
        .route("/api/candidates/stats", get(candidates::handle_candidate_stats))
        .route("/api/candidates/recent", get(candidates::handle_recent_candidates))
        .route(
            "/api/candidates/status/:status",
            get(candidates::handle_candidates_by_status),
        )
        .route(
            "/api/candidates/top-statuses",
            get(candidates::handle_top_statuses),
        )
        // Feedback
        .route("/api/feedback", post(feedback::handle_submit_feedback))
        // Organizations
        .route(
            "/api/organizations",
            post(organizations::handle_upsert_organization),
        )
        .route(
            "/api/organizations/:id",
            get(organizations::handle_get_organization)
                .patch(organizations::handle_update_organization),
        )
        .route(
            "/api/organizations/:id/enforce-plan",
            post(organizations::handle_enforce_plan),
        )
        .route(
            "/api/organizations/:id/response-count",
            get(organizations::handle_response_count),
        )
        .with_state(state)
}
