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
    AddMemberRequest, CreateOrganizationRequest, MemberInfo, Organization,
    OrganizationFilterParams, PaginatedOrganizationsResponse, UpdateOrganizationRequest,
};
use super::service::OrganizationService;

/// Create an organization
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Name already exists", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    let organization = OrganizationService::create(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

/// List organizations visible to the caller
#[utoipa::path(
    get,
    path = "/api/organizations",
    params(OrganizationFilterParams),
    responses(
        (status = 200, description = "Organizations", body = PaginatedOrganizationsResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filters): Query<OrganizationFilterParams>,
) -> Result<Json<PaginatedOrganizationsResponse>, AppError> {
    let response =
        OrganizationService::list(&state.db, auth.user_id(), auth.role, filters).await?;
    Ok(Json(response))
}

/// Fetch one organization
#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization", body = Organization),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, id).await?;
    let organization = OrganizationService::get(&state.db, id).await?;
    Ok(Json(organization))
}

/// Update an organization
#[utoipa::path(
    patch,
    path = "/api/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization id")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = Organization),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, id).await?;
    let organization = OrganizationService::update(&state.db, id, payload).await?;
    Ok(Json(organization))
}

/// Delete an organization
#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    OrganizationService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to an organization
#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members",
    params(("id" = Uuid, Path, description = "Organization id")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberInfo),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberInfo>), AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, id).await?;
    let member = OrganizationService::add_member(&state.db, id, payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// List the members of an organization
#[utoipa::path(
    get,
    path = "/api/organizations/{id}/members",
    params(("id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Members", body = Vec<MemberInfo>),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MemberInfo>>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, id).await?;
    let members = OrganizationService::list_members(&state.db, id).await?;
    Ok(Json(members))
}
