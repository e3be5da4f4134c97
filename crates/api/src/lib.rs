//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - File upload, listing, download and deletion routes
//! - Health check route
//! - JSON error responses

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use filedrop_core::storage::FileStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// File store backing every route.
    pub store: Arc<FileStore>,
    /// Maximum request body size accepted by the upload route, unlimited
    /// when `None`.
    pub max_body_bytes: Option<usize>,
}

impl AppState {
    /// Create state around an opened file store.
    #[must_use]
    pub fn new(store: FileStore, max_body_bytes: Option<usize>) -> Self {
        Self {
            store: Arc::new(store),
            max_body_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
