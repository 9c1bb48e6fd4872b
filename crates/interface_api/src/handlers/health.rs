//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// GET /health - liveness probe
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "vehicle-ledger-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health/ready - readiness probe
///
/// Ready means the gateway can resolve its configured identity; no ledger
/// session is opened.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.gateway.check_ready().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "message": e.to_string(),
            })),
        ),
    }
}
