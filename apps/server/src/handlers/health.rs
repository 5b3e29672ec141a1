//! Health check for load balancers and monitoring.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::AppState;

/// `GET /health`
///
/// 200 `OK` when the database answers a trivial query, else 503.
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}
