use axum::Json;
use axum::extract::State;
use utoipa::ToSchema;

use crate::middleware::auth::AuthUser;
use crate::modules::sessions::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    PasscodeRequest, PasscodeVerifyRequest, ResetPasswordRequest, SwitchOrganizationRequest,
};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login with email and password, receiving a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state, payload).await?;
    Ok(Json(response))
}

/// Invalidate the current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthService::logout(&state, &auth).await?;
    Ok(Json(response))
}

/// The authenticated user and their session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MeResponse>, AppError> {
    state.sessions.touch(&state.db, auth.session.id).await?;
    Ok(Json(MeResponse {
        user: auth.user,
        session: auth.session,
    }))
}

/// Switch the active organization on the current session
#[utoipa::path(
    post,
    path = "/api/auth/active-organization",
    request_body = SwitchOrganizationRequest,
    responses(
        (status = 200, description = "Active organization updated", body = Session),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not a member of that organization", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn switch_active_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<SwitchOrganizationRequest>,
) -> Result<Json<Session>, AppError> {
    let session =
        AuthService::switch_active_organization(&state, &auth, payload.organization_id).await?;
    Ok(Json(session))
}

/// Request a password reset code by email
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code sent if the account exists", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthService::forgot_password(&state, &payload.email).await?;
    Ok(Json(response))
}

/// Reset the password with a previously issued code
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired code", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthService::reset_password(&state, payload).await?;
    Ok(Json(response))
}

/// Request an email verification code
#[utoipa::path(
    post,
    path = "/api/auth/passcode/request",
    request_body = PasscodeRequest,
    responses(
        (status = 200, description = "Verification code sent", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn request_passcode(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasscodeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthService::request_passcode(&state, payload).await?;
    Ok(Json(response))
}

/// Verify an email verification code
#[utoipa::path(
    post,
    path = "/api/auth/passcode/verify",
    request_body = PasscodeVerifyRequest,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired code", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn verify_passcode(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasscodeVerifyRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthService::verify_passcode(&state, payload).await?;
    Ok(Json(response))
}
