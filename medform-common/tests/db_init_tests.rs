//! Tests for database initialization and bootstrap seeding

use medform_common::db::init::{init_database, ADMIN_EMAIL};
use std::path::PathBuf;

fn test_db_path(name: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/medform-test-db-{}-{}.db", name, std::process::id()))
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let db_path = test_db_path("create");
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let db_path = test_db_path("existing");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_all_tables_created() {
    let db_path = test_db_path("tables");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let tables = vec![
        "settings",
        "users",
        "posts",
        "forms",
        "form_questions",
        "form_assignments",
        "reference_overrides",
        "form_submissions",
        "submission_answers",
    ];

    for table in tables {
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(exists, 1, "Table '{}' not created", table);
    }

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_foreign_keys_enabled() {
    let db_path = test_db_path("fk");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let fk_enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(fk_enabled, 1, "Foreign keys should be enabled");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_admin_user_seeded() {
    let db_path = test_db_path("admin");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let admin: (String, i64, i64) = sqlx::query_as(
        "SELECT fullname, is_manager, disabled FROM users WHERE email = ?",
    )
    .bind(ADMIN_EMAIL)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(admin.0, "Administrator");
    assert_eq!(admin.1, 1, "Seeded admin should be a manager");
    assert_eq!(admin.2, 0, "Seeded admin should be enabled");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_idempotent_initialization() {
    let db_path = test_db_path("idempotent");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await.unwrap();
    let users1: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool1)
        .await
        .unwrap();
    drop(pool1);

    // Second init must not duplicate seeded rows or fail on existing tables
    let pool2 = init_database(&db_path).await.unwrap();
    let users2: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool2)
        .await
        .unwrap();

    assert_eq!(users1, users2, "User count changed on second initialization");

    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_token_secret_generated_once() {
    let db_path = test_db_path("secret");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let first = medform_common::auth::load_token_config(&pool).await.unwrap();
    assert!(!first.token_secret.is_empty());
    assert_eq!(first.token_ttl_minutes, 30);

    // Loading again must return the stored secret, not a fresh one
    let second = medform_common::auth::load_token_config(&pool).await.unwrap();
    assert_eq!(first.token_secret, second.token_secret);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}
