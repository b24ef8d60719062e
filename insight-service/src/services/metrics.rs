//! Domain metrics for the analysis endpoints.
//!
//! Recorded through the `metrics` facade; the Prometheus recorder installed by
//! `service_core::observability::init_metrics` exports them on `/metrics`.

use std::time::Duration;

pub const ANALYSIS_REQUESTS_TOTAL: &str = "insight_analysis_requests_total";
pub const MODEL_LATENCY_SECONDS: &str = "insight_model_latency_seconds";
pub const MODEL_ERRORS_TOTAL: &str = "insight_model_errors_total";
pub const AUTHORIZATION_DENIALS_TOTAL: &str = "insight_authorization_denials_total";

/// Endpoint label values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Behavior,
    Drawing,
    ActivitySummary,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Behavior => "behavior",
            Endpoint::Drawing => "drawing",
            Endpoint::ActivitySummary => "activity_summary",
        }
    }
}

/// Count a finished request; `outcome` is `ok` or an error kind.
pub fn record_request(endpoint: Endpoint, outcome: &'static str) {
    metrics::counter!(
        ANALYSIS_REQUESTS_TOTAL,
        "endpoint" => endpoint.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_model_latency(endpoint: Endpoint, elapsed: Duration) {
    metrics::histogram!(MODEL_LATENCY_SECONDS, "endpoint" => endpoint.as_str())
        .record(elapsed.as_secs_f64());
}

pub fn record_model_error(endpoint: Endpoint, kind: &'static str) {
    metrics::counter!(
        MODEL_ERRORS_TOTAL,
        "endpoint" => endpoint.as_str(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_denial(reason: &'static str) {
    metrics::counter!(AUTHORIZATION_DENIALS_TOTAL, "reason" => reason).increment(1);
}
