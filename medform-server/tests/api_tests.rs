//! Integration tests for authentication, users and posts endpoints

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

mod helpers;
use helpers::*;

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _pool) = setup_app("health").await;

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "medform-server");
    assert!(body["version"].is_string());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_signup_and_login_flow() {
    let (app, _pool) = setup_app("signup-login").await;

    let id = signup(&app, "anna@example.com", "Anna Petrova").await;
    assert!(id > 0);

    let token = login(&app, "anna@example.com").await;

    let response = app
        .clone()
        .oneshot(request("GET", "/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let me = body_json(response.into_body()).await;
    assert_eq!(me["email"], "anna@example.com");
    assert_eq!(me["fio"], "Anna Petrova");
    assert_eq!(me["key"], id);
    // Born 1990-04-12; derived age must be present and plausible
    assert!(me["age"].as_u64().unwrap() >= 35);
}

#[tokio::test]
async fn test_signup_duplicate_email_conflict() {
    let (app, _pool) = setup_app("signup-dup").await;

    signup(&app, "anna@example.com", "Anna Petrova").await;

    let body = json!({
        "email": "anna@example.com",
        "password": TEST_PASSWORD,
        "fullname": "Another Anna",
        "gender": "female",
        "born": "1985-01-01",
    });
    let response = app
        .oneshot(json_request("POST", "/auth/signup", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let error = body_json(response.into_body()).await;
    assert!(error["error"].as_str().unwrap().contains("Email already taken"));
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let (app, _pool) = setup_app("login-wrong").await;

    signup(&app, "anna@example.com", "Anna Petrova").await;

    let body = json!({"email": "anna@example.com", "password": "wrong"});
    let response = app
        .oneshot(json_request("POST", "/auth/token", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _pool) = setup_app("no-token").await;

    for uri in ["/auth/me", "/forms/list", "/posts/all"] {
        let response = app.clone().oneshot(request("GET", uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} should require a token", uri);
    }

    let response = app
        .oneshot(request("GET", "/auth/me", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_manager_routes_reject_plain_users() {
    let (app, _pool) = setup_app("manager-only").await;

    let (_, token) = setup_patient(&app, "anna@example.com", "Anna Petrova").await;

    for uri in ["/users/list", "/forms/all"] {
        let response = app
            .clone()
            .oneshot(request("GET", uri, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} should require manager", uri);
    }
}

#[tokio::test]
async fn test_disabled_account_cannot_authenticate() {
    let (app, pool) = setup_app("disabled").await;

    let (id, token) = setup_patient(&app, "anna@example.com", "Anna Petrova").await;

    sqlx::query("UPDATE users SET disabled = 1 WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    // Existing token stops working once the account is disabled
    let response = app
        .clone()
        .oneshot(request("GET", "/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And a fresh login is rejected too
    let body = json!({"email": "anna@example.com", "password": TEST_PASSWORD});
    let response = app
        .oneshot(json_request("POST", "/auth/token", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// User Roster
// =============================================================================

#[tokio::test]
async fn test_users_roster_flow() {
    let (app, pool) = setup_app("roster").await;

    let (_, manager_token) = setup_manager(&app, &pool, "doctor@example.com").await;
    let (patient_id, _) = setup_patient(&app, "anna@example.com", "Anna Petrova").await;

    // Roster lists the patient but not the manager
    let response = app
        .clone()
        .oneshot(request("GET", "/users/list?page=1", Some(&manager_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let roster = body_json(response.into_body()).await;
    assert_eq!(roster["page"], 1);
    assert_eq!(roster["page_size"], 100);
    let items = roster["items"].as_array().unwrap();
    assert!(items.iter().any(|u| u["key"] == patient_id));
    assert!(items.iter().all(|u| u["fio"] != "Dr Manager"));

    // Single-user detail includes the email
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/users/{}", patient_id),
            Some(&manager_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response.into_body()).await;
    assert_eq!(detail["email"], "anna@example.com");
    assert_eq!(detail["latest_form_result"], "ok");
    assert_eq!(detail["is_manager"], false);
}

#[tokio::test]
async fn test_user_update_and_role_elevation() {
    let (app, pool) = setup_app("user-update").await;

    let (_, manager_token) = setup_manager(&app, &pool, "doctor@example.com").await;
    let (patient_id, _) = setup_patient(&app, "anna@example.com", "Anna Petrova").await;
    setup_patient(&app, "boris@example.com", "Boris Ivanov").await;

    // Promote the patient through the API
    let body = json!({
        "email": "anna@example.com",
        "fullname": "Anna Petrova",
        "disabled": false,
        "is_manager": true,
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/users/{}", patient_id),
            Some(&manager_token),
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response.into_body()).await;
    assert_eq!(updated["is_manager"], true);

    // The promoted user can now reach manager routes
    let anna_token = login(&app, "anna@example.com").await;
    let response = app
        .clone()
        .oneshot(request("GET", "/users/list", Some(&anna_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Moving to an email another account holds is a conflict
    let body = json!({
        "email": "boris@example.com",
        "fullname": "Anna Petrova",
        "disabled": false,
        "is_manager": true,
    });
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/users/{}", patient_id),
            Some(&manager_token),
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_user_delete() {
    let (app, pool) = setup_app("user-delete").await;

    let (_, manager_token) = setup_manager(&app, &pool, "doctor@example.com").await;
    let (patient_id, _) = setup_patient(&app, "anna@example.com", "Anna Petrova").await;

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/users/{}", patient_id),
            Some(&manager_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleting again reports the absence
    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/users/{}", patient_id),
            Some(&manager_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Posts
// =============================================================================

#[tokio::test]
async fn test_posts_flow() {
    let (app, pool) = setup_app("posts").await;

    let (_, manager_token) = setup_manager(&app, &pool, "doctor@example.com").await;
    let (_, patient_token) = setup_patient(&app, "anna@example.com", "Anna Petrova").await;

    // Only managers may publish
    let body = json!({"name": "Flu season", "description": "Get vaccinated"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts/create", Some(&patient_token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/posts/create", Some(&manager_token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let post = body_json(response.into_body()).await;
    assert_eq!(post["name"], "Flu season");
    let post_id = post["id"].as_i64().unwrap();

    // Everyone authenticated can read
    let response = app
        .clone()
        .oneshot(request("GET", "/posts/all", Some(&patient_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response.into_body()).await;
    assert!(listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == post_id));

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/posts/{}", post_id),
            Some(&patient_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response.into_body()).await;
    assert_eq!(detail["description"], "Get vaccinated");

    // Missing post is a 404
    let response = app
        .oneshot(request("GET", "/posts/99999", Some(&patient_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
