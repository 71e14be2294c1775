//! Form catalog queries: forms and their ordered questions

use medform_common::db::models::{Form, Question};
use medform_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::users;
use crate::pagination::PAGE_SIZE;

/// Fields of a question create/update request
#[derive(Debug, Clone)]
pub struct QuestionFields {
    pub kind: String,
    pub question: String,
    pub ref_min: Option<i64>,
    pub ref_max: Option<i64>,
}

pub async fn get_form(pool: &SqlitePool, id: i64) -> Result<Option<Form>> {
    let form = sqlx::query_as::<_, Form>("SELECT * FROM forms WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(form)
}

/// Lookup that fails `NotFound` when the form is absent
pub async fn require_form(pool: &SqlitePool, id: i64) -> Result<Form> {
    get_form(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("Form not found".to_string()))
}

pub async fn count_forms(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forms")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn list_forms(pool: &SqlitePool, offset: i64) -> Result<Vec<Form>> {
    let forms = sqlx::query_as::<_, Form>("SELECT * FROM forms ORDER BY id LIMIT ? OFFSET ?")
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(forms)
}

pub async fn count_forms_assigned_to(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM forms f JOIN form_assignments a ON a.form_id = f.id WHERE a.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Forms with an assignment row for the given user
///
/// A form without an assignment row is never returned.
pub async fn list_forms_assigned_to(
    pool: &SqlitePool,
    user_id: i64,
    offset: i64,
) -> Result<Vec<Form>> {
    let forms = sqlx::query_as::<_, Form>(
        r#"
        SELECT f.* FROM forms f
        JOIN form_assignments a ON a.form_id = f.id
        WHERE a.user_id = ?
        ORDER BY f.id LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(PAGE_SIZE)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(forms)
}

/// Create a form with no questions; the creator must be a manager
pub async fn create_form(pool: &SqlitePool, name: &str, creator_id: i64) -> Result<Form> {
    let creator = users::get_user(pool, creator_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    if !creator.is_manager {
        return Err(Error::PermissionDenied("Manager role required".to_string()));
    }

    let id = sqlx::query("INSERT INTO forms (name, user_id) VALUES (?, ?)")
        .bind(name)
        .bind(creator_id)
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_form(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Form row vanished after insert".to_string()))
}

pub async fn update_form(pool: &SqlitePool, id: i64, name: &str) -> Result<()> {
    let result = sqlx::query("UPDATE forms SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Form not found".to_string()));
    }
    Ok(())
}

/// Delete a form; questions, assignments, overrides, submissions and
/// answers go with it through the cascade foreign keys.
pub async fn delete_form(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM forms WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Form not found".to_string()));
    }
    Ok(())
}

/// Questions of a form in creation order
pub async fn list_questions(pool: &SqlitePool, form_id: i64) -> Result<Vec<Question>> {
    let questions =
        sqlx::query_as::<_, Question>("SELECT * FROM form_questions WHERE form_id = ? ORDER BY id")
            .bind(form_id)
            .fetch_all(pool)
            .await?;
    Ok(questions)
}

/// Append a question to a form
///
/// The actor must be a manager and the form's creator.
pub async fn create_question(
    pool: &SqlitePool,
    form_id: i64,
    actor_id: i64,
    fields: QuestionFields,
) -> Result<Question> {
    let actor = users::get_user(pool, actor_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    if !actor.is_manager {
        return Err(Error::PermissionDenied("Manager role required".to_string()));
    }

    let form = require_form(pool, form_id).await?;
    if form.user_id != actor.id {
        return Err(Error::PermissionDenied(
            "You are not allowed to access this form".to_string(),
        ));
    }

    let id = sqlx::query(
        "INSERT INTO form_questions (form_id, kind, question, ref_min, ref_max) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(form_id)
    .bind(&fields.kind)
    .bind(&fields.question)
    .bind(fields.ref_min)
    .bind(fields.ref_max)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_question(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Question row vanished after insert".to_string()))
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> Result<Option<Question>> {
    let question = sqlx::query_as::<_, Question>("SELECT * FROM form_questions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}

pub async fn update_question(pool: &SqlitePool, id: i64, fields: QuestionFields) -> Result<()> {
    let result = sqlx::query(
        "UPDATE form_questions SET kind = ?, question = ?, ref_min = ?, ref_max = ? WHERE id = ?",
    )
    .bind(&fields.kind)
    .bind(&fields.question)
    .bind(fields.ref_min)
    .bind(fields.ref_max)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Question not found".to_string()));
    }
    Ok(())
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM form_questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Question not found".to_string()));
    }
    Ok(())
}
