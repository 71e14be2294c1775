//! Database row models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub fullname: String,
    pub hashed_password: String,
    pub password_salt: String,
    pub gender: String,
    pub born: NaiveDate,
    pub latest_form_result: String,
    pub is_manager: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Form {
    pub id: i64,
    pub name: String,
    /// Creator (a manager)
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub form_id: i64,
    /// Type tag: "text" or "number"
    pub kind: String,
    pub question: String,
    /// Default acceptable range; either bound may be absent (unbounded)
    pub ref_min: Option<i64>,
    pub ref_max: Option<i64>,
}

/// Per-user, per-question range superseding the question's default
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReferenceOverride {
    pub id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub ref_min: Option<i64>,
    pub ref_max: Option<i64>,
}
