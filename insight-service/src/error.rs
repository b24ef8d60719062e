//! Failure taxonomy of the analysis endpoints.
//!
//! Every variant is terminal for its request. Rendering goes through the
//! shared [`AppError`] so the body shape matches the rest of the platform:
//! `{"error": "<message>"}`.

use axum::response::{IntoResponse, Response};
use service_core::error::AppError;
use thiserror::Error;

pub const MISSING_REQUIRED_DATA: &str = "Missing required data";
pub const INVALID_SUMMARY_DATA: &str = "Invalid summary data";
pub const INVALID_CHILD_ID: &str = "Invalid child_id";
pub const INVALID_IMAGE_DATA: &str = "Invalid image data";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing, malformed or unresolvable bearer credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// Valid caller with no relationship to the child.
    #[error("Unauthorized access to child data")]
    Forbidden,

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Child not found")]
    NotFound,

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Could not parse model response: {0}")]
    UpstreamParse(String),
}

impl AnalysisError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Unauthorized => "unauthorized",
            AnalysisError::Forbidden => "forbidden",
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::PayloadTooLarge => "payload_too_large",
            AnalysisError::NotFound => "not_found",
            AnalysisError::Config(_) => "config",
            AnalysisError::Upstream(_) => "upstream",
            AnalysisError::UpstreamParse(_) => "upstream_parse",
        }
    }

    /// Whether the failure is on our side of the wire.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::Config(_) | AnalysisError::Upstream(_) | AnalysisError::UpstreamParse(_)
        )
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let message = err.to_string();
        match err {
            AnalysisError::Unauthorized => AppError::Unauthorized(anyhow::anyhow!(message)),
            AnalysisError::Forbidden => AppError::Forbidden(anyhow::anyhow!(message)),
            AnalysisError::InvalidInput(_) | AnalysisError::PayloadTooLarge => {
                AppError::BadRequest(anyhow::anyhow!(message))
            }
            AnalysisError::NotFound => AppError::NotFound(anyhow::anyhow!(message)),
            AnalysisError::Config(_) => AppError::ConfigError(anyhow::anyhow!(message)),
            AnalysisError::Upstream(_) | AnalysisError::UpstreamParse(_) => {
                AppError::Upstream(message)
            }
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
