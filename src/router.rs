use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::gate::client_gate;
use crate::modules::admin::router::init_admin_router;
use crate::modules::attempts::router::{init_attempts_router, init_participant_attempts_router};
use crate::modules::auth::router::init_auth_router;
use crate::modules::cohorts::router::init_cohorts_router;
use crate::modules::organizations::router::init_organizations_router;
use crate::modules::participants::router::init_participants_router;
use crate::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        // Health stays outside /api so probes bypass the client gate.
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                // Everything nested here is admin-only via the gate's
                // /api/admin prefix rule.
                .nest("/admin", init_admin_router())
                .nest(
                    "/organizations",
                    init_organizations_router(state.clone())
                        .nest("/{org_id}/cohorts", init_cohorts_router())
                        .nest("/{org_id}/participants", init_participants_router()),
                )
                .nest(
                    "/participants/{participant_id}/attempts",
                    init_participant_attempts_router(),
                )
                .nest("/attempts", init_attempts_router())
                .layer(middleware::from_fn_with_state(state.clone(), client_gate)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
