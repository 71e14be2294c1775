//! Submission store and reconstruction
//!
//! Writing: one submission row per submit call plus one answer row per
//! supplied answer, inside a single transaction.
//!
//! Reading: submissions are reconstructed with the *effective* reference
//! range - per bound, the (user, question) override when present, else the
//! question's default. The COALESCE pair in the join implements that
//! per-bound fallback.

use medform_common::{Error, Result};
use serde::Serialize;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::db::{forms, users};

/// One answer of a submit request
#[derive(Debug, Clone)]
pub struct AnswerInput {
    pub field_id: i64,
    pub answer: String,
}

/// Display-ready answer with its effective reference range
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GradedAnswer {
    pub field_id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_max: Option<i64>,
}

/// One submission grouped under the submitting user's display name
///
/// A user with two submissions yields two groups.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionGroup {
    pub fio: String,
    pub answers: Vec<GradedAnswer>,
}

/// Record a submission with its answers in one transaction
///
/// Assignment existence is NOT checked: any known (form, user) pair may
/// submit. Supplying fewer answers than the form has questions is fine -
/// nothing is auto-filled. Returns the new submission id.
pub async fn submit_form(
    pool: &SqlitePool,
    form_id: i64,
    user_id: i64,
    answers: &[AnswerInput],
) -> Result<i64> {
    forms::require_form(pool, form_id).await?;
    users::get_user(pool, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let mut tx = pool.begin().await?;

    let submission_id = sqlx::query("INSERT INTO form_submissions (form_id, user_id) VALUES (?, ?)")
        .bind(form_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for answer in answers {
        record_answer(&mut tx, submission_id, form_id, answer).await?;
    }

    tx.commit().await?;
    Ok(submission_id)
}

/// Insert one answer after checking the question exists and belongs to the
/// submission's form
async fn record_answer(
    tx: &mut Transaction<'_, Sqlite>,
    submission_id: i64,
    form_id: i64,
    answer: &AnswerInput,
) -> Result<()> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT form_id FROM form_questions WHERE id = ?")
        .bind(answer.field_id)
        .fetch_optional(&mut **tx)
        .await?;

    match owner {
        None => Err(Error::NotFound(format!(
            "Question {} not found",
            answer.field_id
        ))),
        Some(owner) if owner != form_id => Err(Error::Conflict(format!(
            "Question {} belongs to another form",
            answer.field_id
        ))),
        Some(_) => {
            sqlx::query(
                "INSERT INTO submission_answers (submission_id, question_id, answer) VALUES (?, ?, ?)",
            )
            .bind(submission_id)
            .bind(answer.field_id)
            .bind(&answer.answer)
            .execute(&mut **tx)
            .await?;
            Ok(())
        }
    }
}

/// Reconstruct every submission on a form for grading/display
///
/// Groups come back in submission insertion order; answers within a group
/// in answer insertion order.
pub async fn list_form_submissions(
    pool: &SqlitePool,
    form_id: i64,
) -> Result<Vec<SubmissionGroup>> {
    let submissions: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT s.id, s.user_id, u.fullname
        FROM form_submissions s
        JOIN users u ON u.id = s.user_id
        WHERE s.form_id = ?
        ORDER BY s.id
        "#,
    )
    .bind(form_id)
    .fetch_all(pool)
    .await?;

    let mut groups = Vec::with_capacity(submissions.len());
    for (submission_id, user_id, fullname) in submissions {
        let answers = sqlx::query_as::<_, GradedAnswer>(
            r#"
            SELECT a.question_id AS field_id,
                   q.question,
                   q.kind,
                   a.answer,
                   COALESCE(r.ref_min, q.ref_min) AS ref_min,
                   COALESCE(r.ref_max, q.ref_max) AS ref_max
            FROM submission_answers a
            JOIN form_questions q ON q.id = a.question_id
            LEFT JOIN reference_overrides r
                   ON r.question_id = a.question_id AND r.user_id = ?
            WHERE a.submission_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(user_id)
        .bind(submission_id)
        .fetch_all(pool)
        .await?;

        groups.push(SubmissionGroup {
            fio: fullname,
            answers,
        });
    }

    Ok(groups)
}
