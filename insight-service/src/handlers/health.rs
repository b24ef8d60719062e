use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness: the process is up and serving.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "insight-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness: analysis requests can only succeed with a gateway key.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.config.gateway_configured() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "reason": "model gateway key not configured"
            })),
        )
    }
}

pub async fn metrics() -> impl IntoResponse {
    service_core::observability::render_metrics()
}
