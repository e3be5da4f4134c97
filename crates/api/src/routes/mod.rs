//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod files;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes(max_body_bytes: Option<usize>) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(files::routes(max_body_bytes))
}
