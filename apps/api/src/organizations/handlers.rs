//! Axum route handlers for the Organizations API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::organization::OrganizationRow;
use crate::organizations::service::{
    enforce_plan_limit, get_organization, get_organization_response_count, update_organization,
    upsert_organization, NewOrganization, OrganizationPatch, PlanCheck,
};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResponseCount {
    pub organization_id: String,
    pub response_count: i64,
}

/// POST /api/organizations
pub async fn handle_upsert_organization(
    State(state): State<AppState>,
    Json(new): Json<NewOrganization>,
) -> Result<Json<OrganizationRow>, AppError> {
    Ok(Json(upsert_organization(&state.db, &new).await?))
}

/// GET /api/organizations/:id
pub async fn handle_get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrganizationRow>, AppError> {
    Ok(Json(get_organization(&state.db, &id).await?))
}

/// PATCH /api/organizations/:id
pub async fn handle_update_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<OrganizationPatch>,
) -> Result<Json<OrganizationRow>, AppError> {
    Ok(Json(update_organization(&state.db, &id, &patch).await?))
}

/// POST /api/organizations/:id/enforce-plan
pub async fn handle_enforce_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanCheck>, AppError> {
    Ok(Json(enforce_plan_limit(&state.db, &id).await?))
}

/// GET /api/organizations/:id/response-count
pub async fn handle_response_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResponseCount>, AppError> {
    let response_count = get_organization_response_count(&state.db, &id).await?;
    Ok(Json(ResponseCount {
        organization_id: id,
        response_count,
    }))
}
