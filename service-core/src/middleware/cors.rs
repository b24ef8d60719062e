//! Permissive cross-origin handling for browser-called endpoints.
//!
//! Browsers call the analysis endpoints directly from the web app, so every
//! response carries a wildcard origin and preflight requests are answered
//! here, before routing or authentication.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header allow-list used when none is configured.
pub const DEFAULT_ALLOWED_HEADERS: &[&str] =
    &["authorization", "x-client-info", "apikey", "content-type"];

#[derive(Debug, Clone)]
pub struct CorsConfig {
    allow_headers: HeaderValue,
    allow_methods: HeaderValue,
}

impl CorsConfig {
    /// Build from header names and methods. Invalid header text falls back to the defaults.
    pub fn new<S: AsRef<str>>(headers: &[S], methods: &[Method]) -> Self {
        let joined = headers
            .iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        let allow_headers = HeaderValue::from_str(&joined).unwrap_or_else(|e| {
            tracing::error!("Invalid CORS header list '{}': {}. Using defaults.", joined, e);
            HeaderValue::from_static("authorization, x-client-info, apikey, content-type")
        });

        let methods = methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let allow_methods = HeaderValue::from_str(&methods)
            .unwrap_or_else(|_| HeaderValue::from_static("POST, GET, OPTIONS"));

        Self {
            allow_headers,
            allow_methods,
        }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            self.allow_headers.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_HEADERS,
            &[Method::POST, Method::GET, Method::OPTIONS],
        )
    }
}

/// Answers OPTIONS with an empty 200 and decorates every other response.
pub async fn cors_middleware(
    State(config): State<Arc<CorsConfig>>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        config.apply(response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    config.apply(response.headers_mut());
    response
}
