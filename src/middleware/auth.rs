use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::error;
use uuid::Uuid;

use crate::modules::auth::model::{User, UserRole};
use crate::modules::sessions::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// The authenticated caller, resolved from the bearer session token.
///
/// The client gate inserts this as a request extension when the session
/// resolves; the extractor falls back to resolving it itself so handlers
/// behind routers without the gate still work.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub role: UserRole,
    pub session: Session,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn active_organization_id(&self) -> Option<Uuid> {
        self.session.active_organization_id
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller behind `headers`, if any.
///
/// Returns `Ok(None)` for missing/unknown/expired tokens; errors only on
/// infrastructure failure so the gate can decide to fail open.
pub async fn resolve_auth(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthUser>, AppError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let Some(session) = state.sessions.validate(&state.db, token).await? else {
        return Ok(None);
    };

    let user = sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, email, password, role, created_at, updated_at
         FROM users
         WHERE id = $1",
    )
    .bind(session.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        error!(user.id = %session.user_id, error = %e, "Database error loading session user");
        AppError::database(e)
    })?;

    let Some(user) = user else {
        // Session row outlived its user; treat as unauthenticated.
        return Ok(None);
    };

    let role = user.user_role()?;
    Ok(Some(AuthUser { user, role, session }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(auth.clone());
        }

        resolve_auth(state, &parts.headers)
            .await?
            .ok_or_else(|| AppError::unauthorized("Authentication required".to_string()))
    }
}
