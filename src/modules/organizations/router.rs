use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{
    add_member, create_organization, delete_organization, get_organization, list_members,
    list_organizations, update_organization,
};

pub fn init_organizations_router(state: AppState) -> Router<AppState> {
    // Creation and deletion are reserved for the global admin role.
    let admin_routes = Router::new()
        .route("/", post(create_organization))
        .route("/{id}", delete(delete_organization))
        .layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/", get(list_organizations))
        .route("/{id}", get(get_organization))
        .route("/{id}", patch(update_organization))
        .route("/{id}/members", post(add_member))
        .route("/{id}/members", get(list_members))
        .merge(admin_routes)
}
