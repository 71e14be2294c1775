//! Posts/announcements endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use medform_common::db::models::Post;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::principal::CurrentUser;
use crate::db::posts;
use crate::pagination::{calculate_pagination, PageQuery, Paged};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub name: String,
    pub description: Option<String>,
}

fn detail(post: Post) -> PostDetail {
    PostDetail {
        id: post.id,
        name: post.name,
        description: post.description,
        user_id: post.user_id,
    }
}

/// GET /posts/all
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paged<PostSummary>>> {
    let total = posts::count_posts(&state.db).await?;
    let pagination = calculate_pagination(total, query.page);
    let rows = posts::list_posts(&state.db, pagination.offset).await?;

    let items = rows
        .into_iter()
        .map(|post| PostSummary {
            id: post.id,
            name: post.name,
        })
        .collect();

    Ok(Json(Paged::new(pagination, total, items)))
}

/// GET /posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<PostDetail>> {
    let post = posts::get_post(&state.db, id)
        .await?
        .ok_or_else(|| medform_common::Error::NotFound("Post not found".to_string()))?;

    Ok(Json(detail(post)))
}

/// POST /posts/create
///
/// The query layer rejects non-manager creators.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<Json<PostDetail>> {
    let post = posts::create_post(
        &state.db,
        user.id,
        &request.name,
        request.description.as_deref(),
    )
    .await?;

    Ok(Json(detail(post)))
}
