mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{
    add_membership, body_json, create_test_cohort, create_test_organization,
    create_test_participant, create_test_user, generate_unique_email, json_request, login,
    setup_test_app,
};

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_fetch_cohort(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "org_admin").await;
    let org = create_test_organization(&pool).await;
    add_membership(&pool, user.id, org.id).await;
    let token = login(&app, &user.email, &user.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/cohorts", org.id),
            Some(&token),
            Some(json!({ "name": "Spring Intake", "description": "March workshop" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cohort = body_json(response).await;

    let response = app
        .oneshot(json_request(
            "GET",
            &format!(
                "/api/organizations/{}/cohorts/{}",
                org.id,
                cohort["id"].as_str().unwrap()
            ),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Spring Intake");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_cohort_name_within_org_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let payload = json!({ "name": "Spring Intake" });
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/cohorts", org.id),
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/cohorts", org.id),
            Some(&token),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cohort_access_denied_across_tenants(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "org_admin").await;
    let mine = create_test_organization(&pool).await;
    let other = create_test_organization(&pool).await;
    add_membership(&pool, user.id, mine.id).await;
    let token = login(&app, &user.email, &user.password).await;

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/organizations/{}/cohorts", other.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cohort_from_other_tenant_reads_as_missing(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org_a = create_test_organization(&pool).await;
    let org_b = create_test_organization(&pool).await;
    let cohort_b = create_test_cohort(&pool, org_b.id).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/organizations/{}/cohorts/{}", org_a.id, cohort_b),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_participant(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "org_admin").await;
    let org = create_test_organization(&pool).await;
    let cohort = create_test_cohort(&pool, org.id).await;
    add_membership(&pool, user.id, org.id).await;
    let token = login(&app, &user.email, &user.password).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/participants", org.id),
            Some(&token),
            Some(json!({
                "first_name": "Pat",
                "last_name": "Participant",
                "email": generate_unique_email(),
                "cohort_id": cohort,
                "send_invitation": true
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["cohort_id"], cohort.to_string());
    assert_eq!(body["organization_id"], org.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_participant_email_unique_per_organization(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let email = generate_unique_email();
    let payload = json!({
        "first_name": "Pat",
        "last_name": "Participant",
        "email": email
    });

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/participants", org.id),
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/participants", org.id),
            Some(&token),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_participant_cannot_join_cohort_from_other_tenant(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org_a = create_test_organization(&pool).await;
    let org_b = create_test_organization(&pool).await;
    let cohort_b = create_test_cohort(&pool, org_b.id).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/organizations/{}/participants", org_a.id),
            Some(&token),
            Some(json!({
                "first_name": "Pat",
                "last_name": "Participant",
                "email": generate_unique_email(),
                "cohort_id": cohort_b
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_participants_filters_by_cohort(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let cohort = create_test_cohort(&pool, org.id).await;
    let in_cohort = create_test_participant(&pool, org.id, Some(cohort)).await;
    let _loose = create_test_participant(&pool, org.id, None).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .oneshot(json_request(
            "GET",
            &format!(
                "/api/organizations/{}/participants?cohort_id={}",
                org.id, cohort
            ),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], in_cohort.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_participant(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/organizations/{}/participants/{}", org.id, participant),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/organizations/{}/participants/{}", org.id, participant),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
