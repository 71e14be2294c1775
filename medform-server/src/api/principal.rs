//! Authenticated-principal extractors
//!
//! Handlers take [`CurrentUser`] or [`CurrentManager`] as an argument; the
//! extractor resolves the bearer token to a live user row before the
//! handler body runs. Returns 401 for missing/invalid tokens and disabled
//! accounts, 403 when a manager route is hit without the role.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use medform_common::db::models::User;
use medform_common::{auth, Error};

use crate::api::error::ApiError;
use crate::db::users;
use crate::AppState;

/// Any authenticated, enabled account
pub struct CurrentUser(pub User);

/// An authenticated account holding the manager role
pub struct CurrentManager(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, Error> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| Error::Unauthorized("Missing bearer token".to_string()))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = auth::decode_token(&state.auth, token)?;

        let user = users::get_user_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| Error::Unauthorized("Could not validate credentials".to_string()))?;

        if user.disabled {
            return Err(Error::Unauthorized("Inactive user".to_string()).into());
        }

        Ok(CurrentUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentManager {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_manager {
            return Err(Error::PermissionDenied("Manager role required".to_string()).into());
        }

        Ok(CurrentManager(user))
    }
}
