use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::isolation::DataIsolationService;
use crate::validator::ValidatedJson;

use super::model::{
    Cohort, CohortFilterParams, CreateCohortRequest, PaginatedCohortsResponse,
    UpdateCohortRequest,
};
use super::service::CohortService;

/// Create a cohort in an organization
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/cohorts",
    params(("org_id" = Uuid, Path, description = "Organization id")),
    request_body = CreateCohortRequest,
    responses(
        (status = 201, description = "Cohort created", body = Cohort),
        (status = 400, description = "Name already used in organization", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cohorts"
)]
pub async fn create_cohort(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateCohortRequest>,
) -> Result<(StatusCode, Json<Cohort>), AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let cohort = CohortService::create(&state.db, org_id, payload).await?;
    Ok((StatusCode::CREATED, Json(cohort)))
}

/// List cohorts in an organization
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/cohorts",
    params(("org_id" = Uuid, Path, description = "Organization id"), CohortFilterParams),
    responses(
        (status = 200, description = "Cohorts", body = PaginatedCohortsResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cohorts"
)]
pub async fn list_cohorts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filters): Query<CohortFilterParams>,
) -> Result<Json<PaginatedCohortsResponse>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let response = CohortService::list(&state.db, org_id, filters).await?;
    Ok(Json(response))
}

/// Fetch one cohort
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/cohorts/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("id" = Uuid, Path, description = "Cohort id")
    ),
    responses(
        (status = 200, description = "Cohort", body = Cohort),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cohorts"
)]
pub async fn get_cohort(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Cohort>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let cohort = CohortService::get(&state.db, org_id, id).await?;
    Ok(Json(cohort))
}

/// Update a cohort
#[utoipa::path(
    patch,
    path = "/api/organizations/{org_id}/cohorts/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("id" = Uuid, Path, description = "Cohort id")
    ),
    request_body = UpdateCohortRequest,
    responses(
        (status = 200, description = "Cohort updated", body = Cohort),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cohorts"
)]
pub async fn update_cohort(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateCohortRequest>,
) -> Result<Json<Cohort>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let cohort = CohortService::update(&state.db, org_id, id, payload).await?;
    Ok(Json(cohort))
}

/// Delete a cohort
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/cohorts/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("id" = Uuid, Path, description = "Cohort id")
    ),
    responses(
        (status = 204, description = "Cohort deleted"),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cohorts"
)]
pub async fn delete_cohort(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    CohortService::delete(&state.db, org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
