//! User roster endpoints (manager only)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use medform_common::db::models::User;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::principal::CurrentManager;
use crate::db::users::{self, UserUpdate};
use crate::pagination::{calculate_pagination, PageQuery, Paged};
use crate::AppState;

/// Roster row for the user listing
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub key: i64,
    pub fio: String,
    pub gender: String,
    pub age: Option<u32>,
    pub latest_form_result: String,
}

/// Full account view for a single-user lookup
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub key: i64,
    pub fio: String,
    pub email: String,
    pub gender: String,
    pub age: Option<u32>,
    pub latest_form_result: String,
    pub disabled: bool,
    pub is_manager: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub fullname: String,
    pub disabled: bool,
    pub is_manager: bool,
}

fn summary(user: &User) -> UserSummary {
    UserSummary {
        key: user.id,
        fio: user.fullname.clone(),
        gender: user.gender.clone(),
        age: Utc::now().date_naive().years_since(user.born),
        latest_form_result: user.latest_form_result.clone(),
    }
}

fn detail(user: &User) -> UserDetail {
    UserDetail {
        key: user.id,
        fio: user.fullname.clone(),
        email: user.email.clone(),
        gender: user.gender.clone(),
        age: Utc::now().date_naive().years_since(user.born),
        latest_form_result: user.latest_form_result.clone(),
        disabled: user.disabled,
        is_manager: user.is_manager,
    }
}

/// GET /users/list
///
/// Non-manager accounts only (the patient roster).
pub async fn list_users(
    State(state): State<AppState>,
    CurrentManager(_): CurrentManager,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paged<UserSummary>>> {
    let total = users::count_users(&state.db).await?;
    let pagination = calculate_pagination(total, query.page);
    let rows = users::list_users(&state.db, pagination.offset).await?;

    let items = rows.iter().map(summary).collect();
    Ok(Json(Paged::new(pagination, total, items)))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    CurrentManager(_): CurrentManager,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserDetail>> {
    let user = users::get_user(&state.db, id)
        .await?
        .ok_or_else(|| medform_common::Error::NotFound("User not found".to_string()))?;

    Ok(Json(detail(&user)))
}

/// PUT /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    CurrentManager(_): CurrentManager,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserDetail>> {
    let user = users::update_user(
        &state.db,
        id,
        UserUpdate {
            email: request.email,
            fullname: request.fullname,
            disabled: request.disabled,
            is_manager: request.is_manager,
        },
    )
    .await?;

    Ok(Json(detail(&user)))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentManager(_): CurrentManager,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    users::delete_user(&state.db, id).await?;
    Ok(Json(json!({"detail": "deleted"})))
}
