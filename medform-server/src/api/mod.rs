//! HTTP API handlers

pub mod auth;
pub mod error;
pub mod forms;
pub mod health;
pub mod posts;
pub mod principal;
pub mod users;

pub use error::{ApiError, ApiResult};
pub use principal::{CurrentManager, CurrentUser};
