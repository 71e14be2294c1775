//! medform-server library - HTTP service for the medform backend
//!
//! Managers author forms of typed questions, assign them to users with
//! per-user reference-range overrides, and review submitted answers graded
//! against the effective range (override over default).

use axum::Router;
use medform_common::auth::AuthConfig;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Token signing configuration, loaded once at startup
    pub auth: AuthConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, auth: AuthConfig) -> Self {
        Self { db, auth }
    }
}

/// Build application router
///
/// All routes except `/health` require a bearer token; manager-only routes
/// enforce the role through the extractor layer.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/token", post(api::auth::token))
        .route("/auth/me", get(api::auth::me))
        .route("/users/list", get(api::users::list_users))
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route("/posts/all", get(api::posts::list_posts))
        .route("/posts/create", post(api::posts::create_post))
        .route("/posts/:id", get(api::posts::get_post))
        .route("/forms/all", get(api::forms::list_all_forms))
        .route("/forms/list", get(api::forms::list_assigned_forms))
        .route("/forms/create", post(api::forms::create_form))
        .route(
            "/forms/field/:id",
            get(api::forms::get_field)
                .put(api::forms::update_field)
                .delete(api::forms::delete_field),
        )
        .route(
            "/forms/:id",
            get(api::forms::get_form)
                .put(api::forms::update_form)
                .delete(api::forms::delete_form),
        )
        .route(
            "/forms/:id/fields",
            get(api::forms::list_fields).post(api::forms::create_field),
        )
        .route("/forms/:id/assign", post(api::forms::assign_form))
        .route("/forms/:id/submit", post(api::forms::submit_form))
        .route("/forms/:id/answers", get(api::forms::list_submissions))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
