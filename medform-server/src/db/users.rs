//! Identity store queries

use chrono::NaiveDate;
use medform_common::db::models::User;
use medform_common::{auth, Error, Result};
use sqlx::SqlitePool;

use crate::pagination::PAGE_SIZE;

/// Fields accepted when creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub fullname: String,
    pub gender: String,
    pub born: NaiveDate,
}

/// Fields a manager may change on an existing account
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub email: String,
    pub fullname: String,
    pub disabled: bool,
    pub is_manager: bool,
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_manager = 0")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Non-manager users only (the patient roster), in id order
pub async fn list_users(pool: &SqlitePool, offset: i64) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_manager = 0 ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(PAGE_SIZE)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Create an account with a freshly salted password hash
///
/// New accounts are enabled non-managers.
pub async fn create_user(pool: &SqlitePool, new: NewUser) -> Result<User> {
    if get_user_by_email(pool, &new.email).await?.is_some() {
        return Err(Error::Conflict("Email already taken".to_string()));
    }

    let salt = auth::generate_salt();
    let hashed = auth::hash_password(&new.password, &salt);

    let id = sqlx::query(
        r#"
        INSERT INTO users (email, fullname, hashed_password, password_salt, gender, born)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.email)
    .bind(&new.fullname)
    .bind(hashed)
    .bind(salt)
    .bind(&new.gender)
    .bind(new.born)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_user(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("User row vanished after insert".to_string()))
}

/// Update profile and role fields
///
/// The email may only move to a value no other account holds.
pub async fn update_user(pool: &SqlitePool, id: i64, update: UserUpdate) -> Result<User> {
    if get_user(pool, id).await?.is_none() {
        return Err(Error::NotFound("User not found".to_string()));
    }

    if let Some(other) = get_user_by_email(pool, &update.email).await? {
        if other.id != id {
            return Err(Error::Conflict("Email already taken".to_string()));
        }
    }

    sqlx::query(
        r#"
        UPDATE users
        SET email = ?, fullname = ?, disabled = ?, is_manager = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&update.email)
    .bind(&update.fullname)
    .bind(update.disabled)
    .bind(update.is_manager)
    .bind(id)
    .execute(pool)
    .await?;

    get_user(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("User row vanished after update".to_string()))
}

pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("User not found".to_string()));
    }
    Ok(())
}
