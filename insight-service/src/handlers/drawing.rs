use super::observe;
use crate::dtos::{DrawingAnalysis, DrawingAnalysisRequest};
use crate::error::AnalysisError;
use crate::middleware::BearerToken;
use crate::services::metrics::Endpoint;
use crate::services::AccessScope;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

/// `POST /drawing-analysis`: art-therapy reading of a child's drawing.
///
/// The caller must be the user the child profile belongs to. The size
/// ceiling is checked before the relationship, so oversized payloads are
/// rejected without touching the child record.
#[tracing::instrument(skip_all, fields(child_id = tracing::field::Empty, caller_id = tracing::field::Empty))]
pub async fn analyze_drawing(
    State(state): State<AppState>,
    token: BearerToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DrawingAnalysis>, AnalysisError> {
    observe(Endpoint::Drawing, run(&state, &token, payload).await).map(Json)
}

async fn run(
    state: &AppState,
    token: &BearerToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<DrawingAnalysis, AnalysisError> {
    let caller = state.gate.authenticate(token.as_str()).await?;
    tracing::Span::current().record("caller_id", caller.id.as_str());

    let input = DrawingAnalysisRequest::from_body(payload)?
        .validate(state.config.limits.max_image_bytes)?;
    tracing::Span::current().record("child_id", tracing::field::display(input.child_id));

    state
        .gate
        .authorize_child(token.as_str(), &caller, input.child_id, AccessScope::Child)
        .await?;

    state.proxy.analyze_drawing(&input.image_data).await
}
