use axum::{extract::Request, middleware::Next, response::Response};

use crate::modules::auth::model::UserRole;
use crate::utils::errors::AppError;

use super::auth::AuthUser;

/// Router layer for admin-only subtrees.
pub async fn require_admin(
    auth: AuthUser,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if auth.role != UserRole::Admin {
        return Err(AppError::forbidden("Admin access required".to_string()));
    }
    Ok(next.run(req).await)
}
