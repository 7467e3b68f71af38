use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::isolation::DataIsolationService;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::token::generate_passcode;

use super::model::{
    LoginRequest, LoginResponse, MessageResponse, PasscodeRequest, PasscodeVerifyRequest,
    ResetPasswordRequest, User,
};

const PURPOSE_EMAIL_VERIFICATION: &str = "email_verification";
const PURPOSE_PASSWORD_RESET: &str = "password_reset";

pub struct AuthService;

impl AuthService {
    /// Verify credentials and hand out a session token. Reuses a live
    /// session when the user already holds one.
    #[instrument(skip(state, payload), fields(user.email = %payload.email))]
    pub async fn login(state: &AppState, payload: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = find_user_by_email(&state.db, &payload.email)
            .await?
            .ok_or_else(|| {
                warn!("Login attempt for unknown email");
                AppError::unauthorized("Invalid email or password".to_string())
            })?;

        if !verify_password(&payload.password, &user.password)? {
            warn!(user.id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let session = state.sessions.authenticate(&state.db, user.id).await?;
        info!(user.id = %user.id, session.id = %session.id, "User logged in");

        Ok(LoginResponse {
            token: session.token.clone(),
            expires_at: session.expires_at,
            user,
        })
    }

    pub async fn logout(state: &AppState, auth: &AuthUser) -> Result<MessageResponse, AppError> {
        state
            .sessions
            .invalidate(&state.db, &auth.session.token)
            .await?;
        Ok(MessageResponse {
            message: "Logged out".to_string(),
        })
    }

    /// Switch (or clear) the caller's active organization, verifying
    /// membership first.
    #[instrument(skip(state, auth), fields(user.id = %auth.user_id()))]
    pub async fn switch_active_organization(
        state: &AppState,
        auth: &AuthUser,
        organization_id: Option<Uuid>,
    ) -> Result<crate::modules::sessions::Session, AppError> {
        if let Some(organization_id) = organization_id {
            DataIsolationService::ensure_access(
                &state.db,
                auth.user_id(),
                auth.role,
                organization_id,
            )
            .await?;
        }

        state
            .sessions
            .set_active_organization(&state.db, &auth.session.token, organization_id)
            .await
    }

    /// Issue a password-reset code. Always answers the same way so the
    /// endpoint does not reveal which emails have accounts.
    #[instrument(skip(state, email))]
    pub async fn forgot_password(state: &AppState, email: &str) -> Result<MessageResponse, AppError> {
        let response = MessageResponse {
            message: "If that email is registered, a reset code has been sent".to_string(),
        };

        let Some(user) = find_user_by_email(&state.db, email).await? else {
            return Ok(response);
        };

        let code = issue_passcode(state, email, PURPOSE_PASSWORD_RESET).await?;
        EmailService::new(state.email_config.clone())
            .send_password_reset_email(email, &user.first_name, &code)
            .await?;

        info!(user.id = %user.id, "Password reset code issued");
        Ok(response)
    }

    /// Consume a reset code, store the new password hash and revoke every
    /// session the user holds.
    #[instrument(skip(state, payload), fields(user.email = %payload.email))]
    pub async fn reset_password(
        state: &AppState,
        payload: ResetPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        consume_passcode(&state.db, &payload.email, &payload.code, PURPOSE_PASSWORD_RESET)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Invalid or expired code")))?;

        let user = find_user_by_email(&state.db, &payload.email)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Invalid or expired code")))?;

        let hashed = hash_password(&payload.new_password)?;
        sqlx::query("UPDATE users SET password = $1, updated_at = now() WHERE id = $2")
            .bind(&hashed)
            .bind(user.id)
            .execute(&state.db)
            .await
            .map_err(|e| {
                error!(user.id = %user.id, error = %e, "Database error updating password");
                AppError::database(e)
            })?;

        state.sessions.invalidate_user(&state.db, user.id).await?;
        info!(user.id = %user.id, "Password reset completed");

        Ok(MessageResponse {
            message: "Password updated, please log in again".to_string(),
        })
    }

    /// Issue an email-verification code.
    #[instrument(skip(state, payload))]
    pub async fn request_passcode(
        state: &AppState,
        payload: PasscodeRequest,
    ) -> Result<MessageResponse, AppError> {
        let name = match find_user_by_email(&state.db, &payload.email).await? {
            Some(user) => user.first_name,
            // Verification codes also go to addresses without an account,
            // e.g. invited participants.
            None => payload
                .email
                .split('@')
                .next()
                .unwrap_or("there")
                .to_string(),
        };

        let code = issue_passcode(state, &payload.email, PURPOSE_EMAIL_VERIFICATION).await?;
        EmailService::new(state.email_config.clone())
            .send_passcode_email(&payload.email, &name, &code)
            .await?;

        Ok(MessageResponse {
            message: "Verification code sent".to_string(),
        })
    }

    #[instrument(skip(state, payload))]
    pub async fn verify_passcode(
        state: &AppState,
        payload: PasscodeVerifyRequest,
    ) -> Result<MessageResponse, AppError> {
        consume_passcode(
            &state.db,
            &payload.email,
            &payload.code,
            PURPOSE_EMAIL_VERIFICATION,
        )
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Invalid or expired code")))?;

        Ok(MessageResponse {
            message: "Email verified".to_string(),
        })
    }
}

async fn find_user_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, email, password, role, created_at, updated_at
         FROM users
         WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(db)
    .await
    .map_err(|e| {
        error!(error = %e, "Database error looking up user by email");
        AppError::database(e)
    })
}

/// Insert a fresh one-time code for `email`/`purpose`, superseding any
/// earlier unconsumed code.
async fn issue_passcode(state: &AppState, email: &str, purpose: &str) -> Result<String, AppError> {
    let code = generate_passcode();
    let expires_at =
        Utc::now() + chrono::Duration::seconds(state.session_config.passcode_ttl_secs);

    sqlx::query(
        "WITH retired AS (
             UPDATE passcodes SET consumed_at = now()
             WHERE email = $1 AND purpose = $2 AND consumed_at IS NULL
         )
         INSERT INTO passcodes (email, code, purpose, expires_at)
         VALUES ($1, $3, $2, $4)",
    )
    .bind(email)
    .bind(purpose)
    .bind(&code)
    .bind(expires_at)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, "Database error issuing passcode");
        AppError::database(e)
    })?;

    Ok(code)
}

/// Mark the newest matching live code as consumed. Returns `None` when no
/// live code matches.
async fn consume_passcode(
    db: &PgPool,
    email: &str,
    code: &str,
    purpose: &str,
) -> Result<Option<Uuid>, AppError> {
    sqlx::query_scalar::<_, Uuid>(
        "UPDATE passcodes SET consumed_at = now()
         WHERE id = (
             SELECT id FROM passcodes
             WHERE email = $1 AND code = $2 AND purpose = $3
               AND consumed_at IS NULL AND expires_at > now()
             ORDER BY created_at DESC
             LIMIT 1
         )
         RETURNING id",
    )
    .bind(email)
    .bind(code)
    .bind(purpose)
    .fetch_optional(db)
    .await
    .map_err(|e| {
        error!(error = %e, "Database error consuming passcode");
        AppError::database(e)
    })
}
