//! Shared helpers for medform-server integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use medform_common::auth::AuthConfig;
use medform_common::db::init::init_database;
use medform_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower::util::ServiceExt; // for `oneshot` method

/// Password used by every test account
pub const TEST_PASSWORD: &str = "secret123";

/// Create a router backed by a fresh database file under /tmp
///
/// The name keeps parallel tests from sharing a database.
pub async fn setup_app(name: &str) -> (Router, SqlitePool) {
    let db_path = PathBuf::from(format!(
        "/tmp/medform-test-{}-{}.db",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.expect("Should initialize test database");

    let auth = AuthConfig {
        token_secret: "integration-test-secret".to_string(),
        token_ttl_minutes: 30,
    };
    let state = AppState::new(pool.clone(), auth);

    (build_router(state), pool)
}

/// Build a request without a body
pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a request carrying a JSON body
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Extract JSON body from a response
pub async fn body_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Sign up an account and return its id
pub async fn signup(app: &Router, email: &str, fullname: &str) -> i64 {
    let body = json!({
        "email": email,
        "password": TEST_PASSWORD,
        "fullname": fullname,
        "gender": "female",
        "born": "1990-04-12",
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/signup", None, &body))
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "Signup for {} failed: {:?}",
        email,
        response.status()
    );

    let profile = body_json(response.into_body()).await;
    profile["key"].as_i64().expect("Signup should return key")
}

/// Grant the manager role directly in the database
pub async fn promote_to_manager(pool: &SqlitePool, user_id: i64) {
    sqlx::query("UPDATE users SET is_manager = 1 WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Should promote user");
}

/// Log in and return a bearer token
pub async fn login(app: &Router, email: &str) -> String {
    let body = json!({"email": email, "password": TEST_PASSWORD});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/token", None, &body))
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "Login for {} failed: {:?}",
        email,
        response.status()
    );

    let token = body_json(response.into_body()).await;
    token["access_token"]
        .as_str()
        .expect("Login should return access_token")
        .to_string()
}

/// Sign up + promote + log in: a ready-to-use manager
pub async fn setup_manager(app: &Router, pool: &SqlitePool, email: &str) -> (i64, String) {
    let id = signup(app, email, "Dr Manager").await;
    promote_to_manager(pool, id).await;
    let token = login(app, email).await;
    (id, token)
}

/// Sign up + log in: a ready-to-use patient
pub async fn setup_patient(app: &Router, email: &str, fullname: &str) -> (i64, String) {
    let id = signup(app, email, fullname).await;
    let token = login(app, email).await;
    (id, token)
}

/// Create a form and return its id
pub async fn create_form(app: &Router, token: &str, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/forms/create",
            Some(token),
            &json!({"name": name}),
        ))
        .await
        .unwrap();
    assert!(response.status().is_success(), "Form creation failed");

    let form = body_json(response.into_body()).await;
    form["id"].as_i64().expect("Form should have id")
}

/// Append a question to a form and return its id
pub async fn add_question(app: &Router, token: &str, form_id: i64, body: &Value) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/forms/{}/fields", form_id),
            Some(token),
            body,
        ))
        .await
        .unwrap();
    assert!(response.status().is_success(), "Question creation failed");

    let question = body_json(response.into_body()).await;
    question["id"].as_i64().expect("Question should have id")
}
