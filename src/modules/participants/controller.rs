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
    CreateParticipantRequest, PaginatedParticipantsResponse, Participant,
    ParticipantFilterParams, UpdateParticipantRequest,
};
use super::service::ParticipantService;

/// Create a participant in an organization
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/participants",
    params(("org_id" = Uuid, Path, description = "Organization id")),
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant created", body = Participant),
        (status = 400, description = "Email already registered in organization", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Participants"
)]
pub async fn create_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let participant = ParticipantService::create(&state, org_id, payload).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// List participants in an organization
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/participants",
    params(("org_id" = Uuid, Path, description = "Organization id"), ParticipantFilterParams),
    responses(
        (status = 200, description = "Participants", body = PaginatedParticipantsResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Participants"
)]
pub async fn list_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filters): Query<ParticipantFilterParams>,
) -> Result<Json<PaginatedParticipantsResponse>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let response = ParticipantService::list(&state.db, org_id, filters).await?;
    Ok(Json(response))
}

/// Fetch one participant
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/participants/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("id" = Uuid, Path, description = "Participant id")
    ),
    responses(
        (status = 200, description = "Participant", body = Participant),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Participants"
)]
pub async fn get_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Participant>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let participant = ParticipantService::get(&state.db, org_id, id).await?;
    Ok(Json(participant))
}

/// Update a participant
#[utoipa::path(
    patch,
    path = "/api/organizations/{org_id}/participants/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("id" = Uuid, Path, description = "Participant id")
    ),
    request_body = UpdateParticipantRequest,
    responses(
        (status = 200, description = "Participant updated", body = Participant),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Participants"
)]
pub async fn update_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateParticipantRequest>,
) -> Result<Json<Participant>, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    let participant = ParticipantService::update(&state.db, org_id, id, payload).await?;
    Ok(Json(participant))
}

/// Delete a participant
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/participants/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("id" = Uuid, Path, description = "Participant id")
    ),
    responses(
        (status = 204, description = "Participant deleted"),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Participants"
)]
pub async fn delete_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;
    ParticipantService::delete(&state.db, org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
