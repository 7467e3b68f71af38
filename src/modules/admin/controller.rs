use axum::Json;
use axum::extract::{Query, State};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::{PaginatedUsersResponse, UserFilterParams};
use super::service::AdminService;

/// List user accounts across all organizations
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "User accounts", body = PaginatedUsersResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    // The client gate rejects non-admin callers on the /api/admin prefix
    // before this handler runs.
    _auth: AuthUser,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let response = AdminService::list_users(&state.db, filters).await?;
    Ok(Json(response))
}
