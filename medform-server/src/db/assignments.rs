//! Assignment ledger: who is expected to complete which form, and the
//! per-user reference-range overrides collected alongside

use medform_common::db::models::ReferenceOverride;
use medform_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::{forms, users};

/// One override entry of an assignment request
#[derive(Debug, Clone)]
pub struct RangeOverride {
    pub question_id: i64,
    pub ref_min: Option<i64>,
    pub ref_max: Option<i64>,
}

/// Assign a form to a user and upsert the supplied range overrides
///
/// The assignment row is created idempotently: assigning the same
/// (form, user) pair again is a no-op success. Each override replaces both
/// bounds of an existing (user, question) row or inserts a new one.
///
/// The whole call runs in one transaction - an unknown question id aborts
/// and rolls back everything, including the assignment row.
pub async fn assign_form(
    pool: &SqlitePool,
    form_id: i64,
    target_user_id: i64,
    overrides: &[RangeOverride],
) -> Result<()> {
    forms::require_form(pool, form_id).await?;
    users::get_user(pool, target_user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT OR IGNORE INTO form_assignments (form_id, user_id) VALUES (?, ?)")
        .bind(form_id)
        .bind(target_user_id)
        .execute(&mut *tx)
        .await?;

    for entry in overrides {
        let known: Option<i64> = sqlx::query_scalar("SELECT id FROM form_questions WHERE id = ?")
            .bind(entry.question_id)
            .fetch_optional(&mut *tx)
            .await?;
        if known.is_none() {
            return Err(Error::NotFound(format!(
                "Question {} not found",
                entry.question_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO reference_overrides (question_id, user_id, ref_min, ref_max)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, question_id)
            DO UPDATE SET ref_min = excluded.ref_min, ref_max = excluded.ref_max
            "#,
        )
        .bind(entry.question_id)
        .bind(target_user_id)
        .bind(entry.ref_min)
        .bind(entry.ref_max)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Override for a (user, question) pair, if one exists
pub async fn get_override(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
) -> Result<Option<ReferenceOverride>> {
    let row = sqlx::query_as::<_, ReferenceOverride>(
        "SELECT * FROM reference_overrides WHERE user_id = ? AND question_id = ?",
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
