//! The client gate layered over `/api`.
//!
//! Order of checks: best-effort session resolution, concurrent-client
//! capacity, fixed-window rate limit, coarse path-prefix role rules. The
//! capacity and rate-limit checks fail open when their maps are unusable;
//! the prefix rules never do.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::limiter::Decision;
use crate::modules::auth::model::UserRole;
use crate::presence::Admission;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::auth::{AuthUser, resolve_auth};

/// Path prefixes that require the global admin role.
const ADMIN_PREFIXES: &[&str] = &["/api/admin"];

/// Path prefixes that require any authenticated caller.
const AUTH_PREFIXES: &[&str] = &["/api/organizations", "/api/participants", "/api/attempts"];

/// Identity the gate resolved for this request, keyed for rate limiting.
#[derive(Debug, Clone)]
pub struct RequestClient {
    pub key: String,
    pub role: Option<UserRole>,
}

pub async fn client_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match admit(&state, &mut req).await {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

async fn admit(state: &AppState, req: &mut Request) -> Result<(), AppError> {
    // Session resolution is best effort: a broken lookup downgrades the
    // caller to anonymous instead of taking the API down.
    let auth = match resolve_auth(state, req.headers()).await {
        Ok(auth) => auth,
        Err(err) => {
            warn!(error = %err.error, "Session resolution failed, treating as anonymous");
            None
        }
    };
    let role = auth.as_ref().map(|a| a.role);

    let key = match &auth {
        Some(auth) => auth.user_id().to_string(),
        None => client_ip(req.headers()),
    };

    match state.active_clients.admit(&key) {
        Ok(Admission::Admitted { .. }) => {}
        Ok(Admission::Rejected { active }) => {
            warn!(client.key = %key, active = active, "Concurrent client capacity reached");
            return Err(AppError::capacity(
                "Server is at capacity, please try again later".to_string(),
            ));
        }
        Err(err) => warn!(error = %err, "Capacity check failed, allowing request"),
    }

    let max = match role {
        Some(UserRole::Admin) => state.rate_limit_config.admin_max,
        Some(UserRole::OrgAdmin) => state.rate_limit_config.org_max,
        Some(UserRole::Viewer) | None => state.rate_limit_config.default_max,
    };
    match state.limiter.check(&key, max) {
        Ok(Decision::Allow { .. }) => {}
        Ok(Decision::Deny { retry_after_secs }) => {
            warn!(client.key = %key, retry_after = retry_after_secs, "Rate limit exceeded");
            return Err(AppError::rate_limited(retry_after_secs));
        }
        Err(err) => warn!(error = %err, "Rate limit check failed, allowing request"),
    }

    check_prefix_rules(req.uri().path(), role)?;

    if let Some(auth) = auth {
        req.extensions_mut().insert::<AuthUser>(auth);
    }
    req.extensions_mut().insert(RequestClient { key, role });
    Ok(())
}

fn check_prefix_rules(path: &str, role: Option<UserRole>) -> Result<(), AppError> {
    if ADMIN_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return match role {
            Some(UserRole::Admin) => Ok(()),
            Some(_) => Err(AppError::forbidden("Admin access required".to_string())),
            None => Err(AppError::unauthorized("Authentication required".to_string())),
        };
    }

    if AUTH_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) && role.is_none() {
        return Err(AppError::unauthorized("Authentication required".to_string()));
    }

    Ok(())
}

/// Best-effort peer address for anonymous clients sitting behind a proxy.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
