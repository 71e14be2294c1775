//! Posts/announcements queries

use medform_common::db::models::Post;
use medform_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::users;
use crate::pagination::PAGE_SIZE;

pub async fn count_posts(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn list_posts(pool: &SqlitePool, offset: i64) -> Result<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY id LIMIT ? OFFSET ?")
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

/// Only managers publish posts
pub async fn create_post(
    pool: &SqlitePool,
    creator_id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<Post> {
    let creator = users::get_user(pool, creator_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    if !creator.is_manager {
        return Err(Error::PermissionDenied("Manager role required".to_string()));
    }

    let id = sqlx::query("INSERT INTO posts (name, description, user_id) VALUES (?, ?, ?)")
        .bind(name)
        .bind(description)
        .bind(creator_id)
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_post(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Post row vanished after insert".to_string()))
}
