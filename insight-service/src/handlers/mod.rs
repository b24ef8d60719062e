//! HTTP handlers for the insight service.

pub mod activity;
pub mod behavior;
pub mod drawing;
pub mod health;

use crate::error::AnalysisError;
use crate::services::metrics::{self, Endpoint};

/// Count the outcome and log failures at a level matching who is at fault.
fn observe<T>(endpoint: Endpoint, result: Result<T, AnalysisError>) -> Result<T, AnalysisError> {
    match &result {
        Ok(_) => metrics::record_request(endpoint, "ok"),
        Err(e) => {
            metrics::record_request(endpoint, e.kind());
            if e.is_server_error() {
                tracing::error!(endpoint = endpoint.as_str(), error = %e, "Request failed");
            } else {
                tracing::warn!(endpoint = endpoint.as_str(), error = %e, "Request rejected");
            }
        }
    }
    result
}
