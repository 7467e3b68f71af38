use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_participant, delete_participant, get_participant, list_participants,
    update_participant,
};

/// Nested under `/api/organizations/{org_id}/participants`.
pub fn init_participants_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_participant))
        .route("/", get(list_participants))
        .route("/{id}", get(get_participant))
        .route("/{id}", patch(update_participant))
        .route("/{id}", delete(delete_participant))
}
