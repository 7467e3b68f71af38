use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    forgot_password, login, logout, me, request_passcode, reset_password,
    switch_active_organization, verify_passcode,
};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/active-organization", post(switch_active_organization))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/passcode/request", post(request_passcode))
        .route("/passcode/verify", post(verify_passcode))
}
