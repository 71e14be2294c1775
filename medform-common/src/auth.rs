//! Credential hashing and bearer-token handling
//!
//! # Architecture
//!
//! - Passwords are stored as SHA-256 of salt + password, with a per-user
//!   random salt kept in its own column.
//! - Access tokens are HS256 JWTs carrying the user's email as `sub`.
//! - The signing secret lives in the database settings table and is
//!   generated on first use; the loaded secret and token TTL travel in an
//!   explicitly-passed [`AuthConfig`] — there is no global signing state.
//!
//! This module contains only pure functions and database operations.
//! No HTTP framework dependencies - those are in the server crate.

use crate::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

/// Length of generated password salts
const SALT_LEN: usize = 16;

/// Length of the generated token signing secret
const SECRET_LEN: usize = 48;

/// Fallback token lifetime when the setting is missing or unparseable
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Token signing configuration, loaded once at startup and carried in
/// application state
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_secret: String,
    pub token_ttl_minutes: i64,
}

/// Bearer-token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,
    /// Expiry as Unix epoch seconds
    pub exp: i64,
}

// ========================================
// Password Hashing
// ========================================

/// Generate a fresh random password salt
pub fn generate_salt() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    let mut rng = rand::thread_rng();
    (0..SALT_LEN).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Hash a password with the given salt (SHA-256 of salt + password,
/// rendered as 64 hex characters)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a plaintext password against a stored salt + hash pair
pub fn verify_password(password: &str, salt: &str, hashed: &str) -> bool {
    hash_password(password, salt) == hashed
}

// ========================================
// Token Issue / Validation
// ========================================

/// Issue a bearer token for the given email, valid for the configured TTL
pub fn issue_token(config: &AuthConfig, email: &str) -> Result<String> {
    let expire = Utc::now() + chrono::Duration::minutes(config.token_ttl_minutes);
    let claims = Claims {
        sub: email.to_string(),
        exp: expire.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token encoding failed: {}", e)))
}

/// Decode and validate a bearer token, returning its claims
///
/// Rejects bad signatures and expired tokens. The caller still has to
/// resolve the subject to a live user record.
pub fn decode_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized("Could not validate credentials".to_string()))
}

// ========================================
// Secret Management
// ========================================

/// Load token signing configuration from the settings table
///
/// Generates and stores a fresh random secret on first use.
pub async fn load_token_config(db: &SqlitePool) -> Result<AuthConfig> {
    let secret: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'token_secret'")
            .fetch_optional(db)
            .await?;

    let token_secret = match secret {
        Some(value) if !value.is_empty() => value,
        _ => initialize_token_secret(db).await?,
    };

    let ttl: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'token_ttl_minutes'")
            .fetch_optional(db)
            .await?;

    let token_ttl_minutes = ttl
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);

    Ok(AuthConfig {
        token_secret,
        token_ttl_minutes,
    })
}

/// Generate a random signing secret and store it in the settings table
async fn initialize_token_secret(db: &SqlitePool) -> Result<String> {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: String = (0..SECRET_LEN).map(|_| rng.sample(Alphanumeric) as char).collect();

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('token_secret', ?)")
        .bind(&secret)
        .execute(db)
        .await?;

    Ok(secret)
}

// ========================================
// Tests
// ========================================
