//! Health check endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Whether the uploads directory is reachable.
    pub storage: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
///
/// Reports 503 when the uploads directory has disappeared, since every
/// file route would fail.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage_ok = match tokio::fs::metadata(state.store.root()).await {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            warn!(error = %e, "Uploads directory unavailable");
            false
        }
    };

    let (code, status, storage) = if storage_ok {
        (StatusCode::OK, "healthy", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            storage,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
