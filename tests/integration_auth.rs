mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    add_membership, body_json, create_test_organization, create_test_user, json_request, login,
    setup_test_app,
};

#[sqlx::test(migrations = "./migrations")]
async fn test_login_returns_session_token(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "viewer").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": user.password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 48);
    assert_eq!(body["user"]["email"], user.email.as_str());
    // The password hash must never leak through the response.
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_with_wrong_password_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "viewer").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "wrong-password" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_reuses_live_session(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "viewer").await;

    let first = login(&app, &user.email, &user.password).await;
    let second = login(&app, &user.email, &user.password).await;
    assert_eq!(first, second);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_returns_user_and_session(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "org_admin").await;
    let token = login(&app, &user.email, &user.password).await;

    let response = app
        .oneshot(json_request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "org_admin");
    assert!(body["session"]["expires_at"].is_string());
    // The raw token never appears in a serialized session.
    assert!(body["session"].get("token").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_without_token_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(json_request("GET", "/api/auth/me", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_invalidates_the_session(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "viewer").await;
    let token = login(&app, &user.email, &user.password).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_switch_active_organization_requires_membership(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "org_admin").await;
    let mine = create_test_organization(&pool).await;
    let other = create_test_organization(&pool).await;
    add_membership(&pool, user.id, mine.id).await;

    let token = login(&app, &user.email, &user.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/active-organization",
            Some(&token),
            Some(json!({ "organization_id": mine.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["active_organization_id"], mine.id.to_string());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/active-organization",
            Some(&token),
            Some(json!({ "organization_id": other.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_password_reset_flow(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "viewer").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": user.email })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Pull the issued code straight from the table; SMTP is disabled in
    // tests.
    let code = sqlx::query_scalar::<_, String>(
        "SELECT code FROM passcodes
         WHERE email = $1 AND purpose = 'password_reset' AND consumed_at IS NULL",
    )
    .bind(&user.email)
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({
                "email": user.email,
                "code": code,
                "new_password": "brand-new-password"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": user.password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    login(&app, &user.email, "brand-new-password").await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_code_cannot_be_reused(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "viewer").await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": user.email })),
        ))
        .await
        .unwrap();

    let code = sqlx::query_scalar::<_, String>(
        "SELECT code FROM passcodes
         WHERE email = $1 AND purpose = 'password_reset' AND consumed_at IS NULL",
    )
    .bind(&user.email)
    .fetch_one(&pool)
    .await
    .unwrap();

    let reset_body = json!({
        "email": user.email,
        "code": code,
        "new_password": "brand-new-password"
    });

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(reset_body.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(reset_body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_passcode_request_and_verify(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let email = format!("verify-{}@test.com", Uuid::new_v4());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/passcode/request",
            None,
            Some(json!({ "email": email })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let code = sqlx::query_scalar::<_, String>(
        "SELECT code FROM passcodes
         WHERE email = $1 AND purpose = 'email_verification' AND consumed_at IS NULL",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(code.len(), 6);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/passcode/verify",
            None,
            Some(json!({ "email": email, "code": code })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong or consumed codes are rejected.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/passcode/verify",
            None,
            Some(json!({ "email": email, "code": code })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
