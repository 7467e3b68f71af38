mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    add_membership, body_json, create_test_organization, create_test_participant,
    create_test_user, json_request, login, setup_test_app,
};

/// Seed one question with a right and a wrong option. Returns
/// `(question_id, correct_option_id, wrong_option_id)`.
async fn seed_question(pool: &PgPool, position: i32) -> (Uuid, Uuid, Uuid) {
    let question_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO questions (prompt, position) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Question {}", position))
    .bind(position)
    .fetch_one(pool)
    .await
    .unwrap();

    let correct = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO options (question_id, label, position) VALUES ($1, 'Right', 1) RETURNING id",
    )
    .bind(question_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let wrong = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO options (question_id, label, position) VALUES ($1, 'Wrong', 2) RETURNING id",
    )
    .bind(question_id)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query("INSERT INTO correct_answers (question_id, option_id) VALUES ($1, $2)")
        .bind(question_id)
        .bind(correct)
        .execute(pool)
        .await
        .unwrap();

    (question_id, correct, wrong)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_start_attempt_per_phase(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "pre" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["phase"], "pre");
    assert!(body["completed_at"].is_null());

    // A second phase is fine; the same phase twice is a conflict.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "post" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "pre" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_phase_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "mid" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_responses_and_computed_report(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let (q1, q1_correct, _) = seed_question(&pool, 1).await;
    let (q2, _, q2_wrong) = seed_question(&pool, 2).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "pre" })),
        ))
        .await
        .unwrap();
    let attempt = body_json(response).await;
    let attempt_id = attempt["id"].as_str().unwrap().to_string();

    for (question, option) in [(q1, q1_correct), (q2, q2_wrong)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/attempts/{}/responses", attempt_id),
                Some(&token),
                Some(json!({ "question_id": question, "option_id": option })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Complete without a report: one is computed from the answer key.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/attempts/{}/complete", attempt_id),
            Some(&token),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["completed_at"].is_string());
    assert_eq!(body["report"]["total_questions"], 2);
    assert_eq!(body["report"]["answered"], 2);
    assert_eq!(body["report"]["correct"], 1);
    assert_eq!(body["report"]["score_percent"], 50.0);

    // A completed attempt takes no more answers and no second completion.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/attempts/{}/responses", attempt_id),
            Some(&token),
            Some(json!({ "question_id": q1, "option_id": q1_correct })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/attempts/{}/complete", attempt_id),
            Some(&token),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_option_must_match_question(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let (q1, _, _) = seed_question(&pool, 1).await;
    let (_, q2_correct, _) = seed_question(&pool, 2).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "pre" })),
        ))
        .await
        .unwrap();
    let attempt = body_json(response).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/attempts/{}/responses", attempt["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "question_id": q1, "option_id": q2_correct })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_caller_supplied_report_is_stored(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "post" })),
        ))
        .await
        .unwrap();
    let attempt = body_json(response).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/attempts/{}/complete", attempt["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "report": { "score_percent": 87.5, "notes": "manual" } })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["report"]["score_percent"], 87.5);
    assert_eq!(body["report"]["notes"], "manual");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attempts_are_tenant_isolated(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let outsider = create_test_user(&pool, "org_admin").await;
    let their_org = create_test_organization(&pool).await;
    add_membership(&pool, outsider.id, their_org.id).await;

    let other_org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, other_org.id, None).await;

    let admin = create_test_user(&pool, "admin").await;
    let admin_token = login(&app, &admin.email, &admin.password).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&admin_token),
            Some(json!({ "phase": "pre" })),
        ))
        .await
        .unwrap();
    let attempt = body_json(response).await;

    let token = login(&app, &outsider.email, &outsider.password).await;
    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/attempts/{}", attempt["id"].as_str().unwrap()),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_attempt(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin").await;
    let org = create_test_organization(&pool).await;
    let participant = create_test_participant(&pool, org.id, None).await;
    let token = login(&app, &admin.email, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/participants/{}/attempts", participant),
            Some(&token),
            Some(json!({ "phase": "pre" })),
        ))
        .await
        .unwrap();
    let attempt = body_json(response).await;
    let attempt_id = attempt["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/attempts/{}", attempt_id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/attempts/{}", attempt_id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
