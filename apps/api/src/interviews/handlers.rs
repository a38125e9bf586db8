//! Axum route handlers for the Interviews API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::interviews::documents::{ingest_context_document, is_pdf, ContextDocument};
use crate::interviews::questions::{
    generate_questions, GenerateQuestionsRequest, GenerateQuestionsResponse,
};
use crate::interviews::service::{
    create_interview, delete_interview, get_interview, list_interviews, update_interview,
    CreateInterviewRequest, InterviewListQuery, InterviewPatch,
};
use crate::models::interview::InterviewRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct OrganizationQuery {
    pub organization_id: String,
}

/// POST /api/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let interview = create_interview(&state.db, &state.config.base_url, request).await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /api/interviews?organization_id=&user_id=&interviewer_id=
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(query): Query<InterviewListQuery>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    Ok(Json(list_interviews(&state.db, &query).await?))
}

/// GET /api/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InterviewRow>, AppError> {
    Ok(Json(get_interview(&state.db, &id).await?))
}

/// PATCH /api/interviews/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<InterviewPatch>,
) -> Result<Json<InterviewRow>, AppError> {
    Ok(Json(update_interview(&state.db, &id, patch).await?))
}

/// DELETE /api/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    delete_interview(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/interviews/generate-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    Ok(Json(generate_questions(&state.llm, &request).await?))
}

/// POST /api/interviews/context-document?organization_id=
///
/// Multipart upload with a single `file` field holding a PDF.
pub async fn handle_upload_context_document(
    State(state): State<AppState>,
    Query(query): Query<OrganizationQuery>,
    mut multipart: Multipart,
) -> Result<Json<ContextDocument>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        if !is_pdf(&file_name, content_type.as_deref(), &bytes) {
            return Err(AppError::Validation("Only PDF documents are supported".to_string()));
        }

        let document = ingest_context_document(
            &state.s3,
            &state.config.s3_bucket,
            &query.organization_id,
            file_name,
            bytes,
        )
        .await?;
        return Ok(Json(document));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}
