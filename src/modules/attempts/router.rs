use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    complete_attempt, delete_attempt, get_attempt, list_attempts, list_responses,
    record_response, start_attempt,
};

/// Nested under `/api/participants/{participant_id}/attempts`.
pub fn init_participant_attempts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_attempt))
        .route("/", get(list_attempts))
}

/// Mounted at `/api/attempts`.
pub fn init_attempts_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_attempt))
        .route("/{id}", delete(delete_attempt))
        .route("/{id}/complete", post(complete_attempt))
        .route("/{id}/responses", post(record_response))
        .route("/{id}/responses", get(list_responses))
}
