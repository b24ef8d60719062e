pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    extract::DefaultBodyLimit,
    http::{Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    cors::{cors_middleware, CorsConfig},
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::InsightConfig;
use crate::services::{AuthorizationGate, ModelProxy, RecordStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<InsightConfig>,
    pub store: Arc<dyn RecordStore>,
    pub gate: AuthorizationGate,
    pub proxy: ModelProxy,
}

impl AppState {
    pub fn new(
        config: InsightConfig,
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn services::providers::ChatProvider>,
    ) -> Self {
        let proxy = ModelProxy::new(provider, config.gateway.structured_output);
        Self {
            config: Arc::new(config),
            gate: AuthorizationGate::new(store.clone()),
            store,
            proxy,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = Arc::new(CorsConfig::new(
        state.config.cors.allowed_headers.as_slice(),
        &[Method::POST, Method::GET, Method::OPTIONS],
    ));
    let body_limit = state.config.limits.body_limit_bytes;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics))
        .route(
            "/behavior-analysis",
            post(handlers::behavior::analyze_behavior),
        )
        .route("/drawing-analysis", post(handlers::drawing::analyze_drawing))
        .route(
            "/activity-summary",
            get(handlers::activity::activity_summary),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        // Preflight is answered here, before tracing and authentication
        .layer(from_fn_with_state(cors, cors_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
}
