//! Database initialization
//!
//! Creates the schema on first run and is safe to call repeatedly.
//! Entities are keyed by integer ids with explicit foreign keys; joins are
//! spelled out in the query layer rather than carried by an object graph.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Email of the manager account seeded when no manager exists
pub const ADMIN_EMAIL: &str = "admin@medform.local";

/// Default password of the seeded manager account
const ADMIN_DEFAULT_PASSWORD: &str = "changeme";

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Options apply to every pooled connection: foreign keys must be ON
    // everywhere (cascade deletes depend on it), WAL allows concurrent
    // readers with one writer.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Schema creation (idempotent - safe to call multiple times)
    create_settings_table(&pool).await?;
    create_users_table(&pool).await?;
    create_posts_table(&pool).await?;
    create_forms_table(&pool).await?;
    create_form_questions_table(&pool).await?;
    create_form_assignments_table(&pool).await?;
    create_reference_overrides_table(&pool).await?;
    create_form_submissions_table(&pool).await?;
    create_submission_answers_table(&pool).await?;

    init_default_settings(&pool).await?;
    ensure_admin_user(&pool).await?;

    Ok(pool)
}

/// Create the settings table
///
/// Stores application configuration key-value pairs, including the token
/// signing secret.
async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            fullname TEXT NOT NULL DEFAULT '',
            hashed_password TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            gender TEXT NOT NULL DEFAULT 'unspecified',
            born DATE NOT NULL,
            latest_form_result TEXT NOT NULL DEFAULT 'ok',
            is_manager INTEGER NOT NULL DEFAULT 0,
            disabled INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_posts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_forms_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS forms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Questions belong to exactly one form; both range bounds are
/// independently optional (NULL = unbounded on that side).
async fn create_form_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS form_questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            form_id INTEGER NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
            kind TEXT NOT NULL DEFAULT 'number',
            question TEXT NOT NULL,
            ref_min INTEGER,
            ref_max INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// At most one assignment per (form, user); duplicate inserts are ignored
async fn create_form_assignments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS form_assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            form_id INTEGER NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id),
            UNIQUE (form_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// At most one override per (user, question); re-assignment upserts
async fn create_reference_overrides_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_overrides (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL REFERENCES form_questions(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id),
            ref_min INTEGER,
            ref_max INTEGER,
            UNIQUE (user_id, question_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// No uniqueness on (form, user): every submit call creates a fresh row
async fn create_form_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS form_submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            form_id INTEGER NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_submission_answers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submission_answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES form_submissions(id) ON DELETE CASCADE,
            question_id INTEGER NOT NULL REFERENCES form_questions(id) ON DELETE CASCADE,
            answer TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "token_ttl_minutes", "30").await?;

    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT COUNT(*) > 0 FROM settings WHERE key = ? AND value IS NOT NULL")
            .bind(key)
            .fetch_one(pool)
            .await?;

    if !exists {
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Seed a manager account when none exists
///
/// Role elevation happens through the user-update endpoint, which only a
/// manager may call, so a fresh database needs one bootstrapped manager.
async fn ensure_admin_user(pool: &SqlitePool) -> Result<()> {
    let managers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_manager = 1")
        .fetch_one(pool)
        .await?;

    if managers > 0 {
        return Ok(());
    }

    let salt = crate::auth::generate_salt();
    let hashed = crate::auth::hash_password(ADMIN_DEFAULT_PASSWORD, &salt);

    sqlx::query(
        r#"
        INSERT INTO users (email, fullname, hashed_password, password_salt, gender, born, is_manager)
        VALUES (?, 'Administrator', ?, ?, 'unspecified', '1970-01-01', 1)
        "#,
    )
    .bind(ADMIN_EMAIL)
    .bind(hashed)
    .bind(salt)
    .execute(pool)
    .await?;

    warn!(
        "Seeded manager account {} with the default password - change it before exposing the server",
        ADMIN_EMAIL
    );

    Ok(())
}
