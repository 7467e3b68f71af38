use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::isolation::DataIsolationService;
use crate::validator::ValidatedJson;

use super::model::{
    Attempt, CompleteAttemptRequest, RecordResponseRequest, Response, StartAttemptRequest,
};
use super::service::AttemptService;

/// Start an assessment attempt for a participant
#[utoipa::path(
    post,
    path = "/api/participants/{participant_id}/attempts",
    params(("participant_id" = Uuid, Path, description = "Participant id")),
    request_body = StartAttemptRequest,
    responses(
        (status = 201, description = "Attempt started", body = Attempt),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Participant not found", body = ErrorResponse),
        (status = 409, description = "Attempt for this phase already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn start_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(participant_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<StartAttemptRequest>,
) -> Result<(StatusCode, Json<Attempt>), AppError> {
    let org_id = AttemptService::organization_for_participant(&state.db, participant_id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    let attempt = AttemptService::start(&state.db, participant_id, &payload.phase).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// List a participant's attempts
#[utoipa::path(
    get,
    path = "/api/participants/{participant_id}/attempts",
    params(("participant_id" = Uuid, Path, description = "Participant id")),
    responses(
        (status = 200, description = "Attempts", body = Vec<Attempt>),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Participant not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn list_attempts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(participant_id): Path<Uuid>,
) -> Result<Json<Vec<Attempt>>, AppError> {
    let org_id = AttemptService::organization_for_participant(&state.db, participant_id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    let attempts = AttemptService::list_for_participant(&state.db, participant_id).await?;
    Ok(Json(attempts))
}

/// Fetch one attempt
#[utoipa::path(
    get,
    path = "/api/attempts/{id}",
    params(("id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Attempt", body = Attempt),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn get_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Attempt>, AppError> {
    let org_id = AttemptService::organization_for_attempt(&state.db, id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    let attempt = AttemptService::get(&state.db, id).await?;
    Ok(Json(attempt))
}

/// Complete an attempt and store its report
#[utoipa::path(
    post,
    path = "/api/attempts/{id}/complete",
    params(("id" = Uuid, Path, description = "Attempt id")),
    request_body = CompleteAttemptRequest,
    responses(
        (status = 200, description = "Attempt completed", body = Attempt),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Already completed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn complete_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CompleteAttemptRequest>,
) -> Result<Json<Attempt>, AppError> {
    let org_id = AttemptService::organization_for_attempt(&state.db, id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    let attempt = AttemptService::complete(&state.db, id, payload.report).await?;
    Ok(Json(attempt))
}

/// Delete an attempt
#[utoipa::path(
    delete,
    path = "/api/attempts/{id}",
    params(("id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 204, description = "Attempt deleted"),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn delete_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let org_id = AttemptService::organization_for_attempt(&state.db, id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    AttemptService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record an answer on an open attempt
#[utoipa::path(
    post,
    path = "/api/attempts/{id}/responses",
    params(("id" = Uuid, Path, description = "Attempt id")),
    request_body = RecordResponseRequest,
    responses(
        (status = 200, description = "Response recorded", body = Response),
        (status = 400, description = "Option does not match question", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 409, description = "Attempt already completed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn record_response(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RecordResponseRequest>,
) -> Result<Json<Response>, AppError> {
    let org_id = AttemptService::organization_for_attempt(&state.db, id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    let response = AttemptService::record_response(&state.db, id, payload).await?;
    Ok(Json(response))
}

/// List the answers recorded on an attempt
#[utoipa::path(
    get,
    path = "/api/attempts/{id}/responses",
    params(("id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Responses", body = Vec<Response>),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attempts"
)]
pub async fn list_responses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Response>>, AppError> {
    let org_id = AttemptService::organization_for_attempt(&state.db, id).await?;
    DataIsolationService::ensure_access(&state.db, auth.user_id(), auth.role, org_id).await?;

    let responses = AttemptService::list_responses(&state.db, id).await?;
    Ok(Json(responses))
}
