use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

use super::controller::{create_cohort, delete_cohort, get_cohort, list_cohorts, update_cohort};

/// Nested under `/api/organizations/{org_id}/cohorts`.
pub fn init_cohorts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cohort))
        .route("/", get(list_cohorts))
        .route("/{id}", get(get_cohort))
        .route("/{id}", patch(update_cohort))
        .route("/{id}", delete(delete_cohort))
}
