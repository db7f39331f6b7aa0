//! Liveness and readiness endpoints.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stockroom_core::store::InventoryStore;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Always `"Server is running"`
    pub message: &'static str,
    /// Current server time
    pub timestamp: DateTime<Utc>,
    /// Crate version
    pub version: &'static str,
}

/// Readiness payload.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Whether the service can take traffic
    pub ready: bool,
    /// Whether the datastore answered
    pub database: bool,
}

/// `GET /api/health`: the process is up. Does not touch the datastore.
#[allow(clippy::unused_async)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        timestamp: state.clock().now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/ready`: 200 when the datastore answers a ping, 503 otherwise.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match state.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                ready: true,
                database: true,
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    ready: false,
                    database: false,
                }),
            )
        }
    }
}
