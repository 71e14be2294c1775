//! Account signup, token issuance and the current-user endpoint

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use medform_common::db::models::User;
use medform_common::{auth, Error};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::principal::CurrentUser;
use crate::db::users::{self, NewUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub fullname: String,
    pub gender: String,
    pub born: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public view of an account, age derived from the birth date
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub key: i64,
    pub fio: String,
    pub email: String,
    pub gender: String,
    pub age: Option<u32>,
    pub disabled: bool,
}

impl UserProfile {
    pub fn from_user(user: &User) -> Self {
        Self {
            key: user.id,
            fio: user.fullname.clone(),
            email: user.email.clone(),
            gender: user.gender.clone(),
            age: Utc::now().date_naive().years_since(user.born),
            disabled: user.disabled,
        }
    }
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Json<UserProfile>> {
    let user = users::create_user(
        &state.db,
        NewUser {
            email: request.email,
            password: request.password,
            fullname: request.fullname,
            gender: request.gender,
            born: request.born,
        },
    )
    .await?;

    Ok(Json(UserProfile::from_user(&user)))
}

/// POST /auth/token
///
/// Verifies the salted password hash and issues a bearer token. The same
/// rejection covers unknown emails and wrong passwords.
pub async fn token(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = users::get_user_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| Error::Unauthorized("Incorrect email or password".to_string()))?;

    if !auth::verify_password(&request.password, &user.password_salt, &user.hashed_password) {
        return Err(Error::Unauthorized("Incorrect email or password".to_string()).into());
    }
    if user.disabled {
        return Err(Error::Unauthorized("Inactive user".to_string()).into());
    }

    let access_token = auth::issue_token(&state.auth, &user.email)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from_user(&user))
}
