use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interviews::service::deactivate_interviews_by_org;
use crate::models::organization::{OrganizationRow, PLAN_FREE, PLAN_FREE_TRIAL_OVER, PLAN_PRO};
use crate::responses::service::get_response_count_by_organization;

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
    /// Identity-provider organization id.
    pub id: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub plan: Option<String>,
    pub allowed_responses_count: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanCheck {
    pub organization_id: String,
    pub plan: String,
    pub response_count: i64,
    pub allowed_responses_count: i32,
    /// Set when this check moved the organization off the free plan.
    pub limit_reached: bool,
    pub deactivated_interviews: u64,
}

fn validate_patch(patch: &OrganizationPatch) -> Result<(), AppError> {
    if let Some(plan) = &patch.plan {
        if ![PLAN_FREE, PLAN_PRO, PLAN_FREE_TRIAL_OVER].contains(&plan.as_str()) {
            return Err(AppError::Validation(format!("Unknown plan '{plan}'")));
        }
    }
    if matches!(patch.allowed_responses_count, Some(n) if n < 0) {
        return Err(AppError::Validation(
            "allowed_responses_count cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Only free-plan organizations are capped.
pub fn plan_limit_reached(organization: &OrganizationRow, response_count: i64) -> bool {
    organization.plan == PLAN_FREE
        && response_count >= organization.allowed_responses_count as i64
}

pub async fn find_organization(
    pool: &PgPool,
    id: &str,
) -> Result<Option<OrganizationRow>, AppError> {
    Ok(
        sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organization WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_organization(pool: &PgPool, id: &str) -> Result<OrganizationRow, AppError> {
    find_organization(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Organization {id} not found")))
}

/// Creates the organization on first sight; later calls refresh name and image only.
pub async fn upsert_organization(
    pool: &PgPool,
    new: &NewOrganization,
) -> Result<OrganizationRow, AppError> {
    if new.id.trim().is_empty() {
        return Err(AppError::Validation("id cannot be empty".to_string()));
    }

    Ok(sqlx::query_as::<_, OrganizationRow>(
        r#"
        INSERT INTO organization (id, name, image_url)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
        SET name = COALESCE(EXCLUDED.name, organization.name),
            image_url = COALESCE(EXCLUDED.image_url, organization.image_url)
        RETURNING *
        "#,
    )
    .bind(new.id.trim())
    .bind(&new.name)
    .bind(&new.image_url)
    .fetch_one(pool)
    .await?)
}

pub async fn update_organization(
    pool: &PgPool,
    id: &str,
    patch: &OrganizationPatch,
) -> Result<OrganizationRow, AppError> {
    validate_patch(patch)?;

    sqlx::query_as::<_, OrganizationRow>(
        r#"
        UPDATE organization
        SET name = COALESCE($2, name),
            image_url = COALESCE($3, image_url),
            plan = COALESCE($4, plan),
            allowed_responses_count = COALESCE($5, allowed_responses_count)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.image_url)
    .bind(&patch.plan)
    .bind(patch.allowed_responses_count)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Organization {id} not found")))
}

/// Ends the free trial once the organization has collected its allowance of
/// responses: every interview is deactivated and the plan becomes `free_trial_over`.
pub async fn enforce_plan_limit(pool: &PgPool, id: &str) -> Result<PlanCheck, AppError> {
    let organization = get_organization(pool, id).await?;
    let response_count = get_response_count_by_organization(pool, id).await?;

    if !plan_limit_reached(&organization, response_count) {
        return Ok(PlanCheck {
            organization_id: organization.id,
            plan: organization.plan,
            response_count,
            allowed_responses_count: organization.allowed_responses_count,
            limit_reached: false,
            deactivated_interviews: 0,
        });
    }

    let deactivated_interviews = deactivate_interviews_by_org(pool, id).await?;
    let updated = update_organization(
        pool,
        id,
        &OrganizationPatch {
            plan: Some(PLAN_FREE_TRIAL_OVER.to_string()),
            ..Default::default()
        },
    )
    .await?;

    warn!(
        "Organization {id} reached {response_count}/{} responses; deactivated {deactivated_interviews} interviews",
        updated.allowed_responses_count
    );

    Ok(PlanCheck {
        organization_id: updated.id,
        plan: updated.plan,
        response_count,
        allowed_responses_count: updated.allowed_responses_count,
        limit_reached: true,
        deactivated_interviews,
    })
}

pub async fn get_organization_response_count(pool: &PgPool, id: &str) -> Result<i64, AppError> {
    get_organization(pool, id).await?;
    let count = get_response_count_by_organization(pool, id).await?;
    info!("Organization {id} has {count} responses");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn org(plan: &str, allowed: i32) -> OrganizationRow {
        OrganizationRow {
            id: "org_1".to_string(),
            created_at: Utc::now(),
            name: Some("Acme".to_string()),
            image_url: None,
            plan: plan.to_string(),
            allowed_responses_count: allowed,
        }
    }

    #[test]
    fn test_free_plan_limit() {
        assert!(!plan_limit_reached(&org(PLAN_FREE, 10), 9));
        assert!(plan_limit_reached(&org(PLAN_FREE, 10), 10));
        assert!(plan_limit_reached(&org(PLAN_FREE, 10), 25));
    }

    #[test]
    fn test_other_plans_uncapped() {
        assert!(!plan_limit_reached(&org(PLAN_PRO, 10), 500));
        assert!(!plan_limit_reached(&org(PLAN_FREE_TRIAL_OVER, 10), 500));
    }

    #[test]
    fn test_patch_validation() {
        let bad_plan = OrganizationPatch {
            plan: Some("enterprise".to_string()),
            ..Default::default()
        };
        assert!(matches!(validate_patch(&bad_plan), Err(AppError::Validation(_))));

        let negative = OrganizationPatch {
            allowed_responses_count: Some(-1),
            ..Default::default()
        };
        assert!(validate_patch(&negative).is_err());

        let ok = OrganizationPatch {
            plan: Some(PLAN_PRO.to_string()),
            allowed_responses_count: Some(100),
            ..Default::default()
        };
        assert!(validate_patch(&ok).is_ok());
    }
}
