use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use scorebook::config::capacity::CapacityConfig;
use scorebook::config::cors::CorsConfig;
use scorebook::config::email::EmailConfig;
use scorebook::config::rate_limit::RateLimitConfig;
use scorebook::config::session::SessionConfig;
use scorebook::router::init_router;
use scorebook::state::AppState;
use scorebook::utils::password::hash_password;

pub const TEST_PASSWORD: &str = "password123";

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

#[allow(dead_code)]
pub struct TestOrganization {
    pub id: Uuid,
    pub name: String,
}

pub fn test_state(pool: PgPool) -> AppState {
    test_state_with(pool, RateLimitConfig::default(), CapacityConfig::default())
}

pub fn test_state_with(
    pool: PgPool,
    rate_limit_config: RateLimitConfig,
    capacity_config: CapacityConfig,
) -> AppState {
    AppState::with_pool(
        pool,
        CorsConfig::from_env(),
        EmailConfig::from_env(),
        SessionConfig::default(),
        rate_limit_config,
        capacity_config,
    )
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

/// Insert a user with the given role (`admin`, `org_admin` or `viewer`).
pub async fn create_test_user(pool: &PgPool, role: &str) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (first_name, last_name, email, password, role)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind("Test")
    .bind("User")
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: TEST_PASSWORD.to_string(),
    }
}

pub async fn create_test_organization(pool: &PgPool) -> TestOrganization {
    let name = format!("Test Org {}", Uuid::new_v4());
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO organizations (name, contact_email)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(&name)
    .bind("contact@test.com")
    .fetch_one(pool)
    .await
    .unwrap();

    TestOrganization { id, name }
}

pub async fn add_membership(pool: &PgPool, user_id: Uuid, organization_id: Uuid) {
    sqlx::query("INSERT INTO members (user_id, organization_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(organization_id)
        .execute(pool)
        .await
        .unwrap();
}

#[allow(dead_code)]
pub async fn create_test_cohort(pool: &PgPool, organization_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO cohorts (organization_id, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(organization_id)
    .bind(format!("Cohort {}", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_participant(
    pool: &PgPool,
    organization_id: Uuid,
    cohort_id: Option<Uuid>,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO participants (organization_id, cohort_id, first_name, last_name, email)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(organization_id)
    .bind(cohort_id)
    .bind("Pat")
    .bind("Participant")
    .bind(generate_unique_email())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Log in through the API and return the session token.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

/// Build a JSON request, optionally with a bearer token.
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.10");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
