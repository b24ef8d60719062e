use super::observe;
use crate::dtos::{BehaviorAnalysisRequest, BehaviorPortrait};
use crate::error::AnalysisError;
use crate::middleware::BearerToken;
use crate::services::metrics::Endpoint;
use crate::services::AccessScope;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

/// `POST /behavior-analysis`: portrait and advice for a child, parents only.
#[tracing::instrument(skip_all, fields(child_id = tracing::field::Empty, caller_id = tracing::field::Empty))]
pub async fn analyze_behavior(
    State(state): State<AppState>,
    token: BearerToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BehaviorPortrait>, AnalysisError> {
    observe(Endpoint::Behavior, run(&state, &token, payload).await).map(Json)
}

async fn run(
    state: &AppState,
    token: &BearerToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<BehaviorPortrait, AnalysisError> {
    let caller = state.gate.authenticate(token.as_str()).await?;
    tracing::Span::current().record("caller_id", caller.id.as_str());

    let input = BehaviorAnalysisRequest::from_body(payload)?.validate()?;
    tracing::Span::current().record("child_id", tracing::field::display(input.child_id));

    state
        .gate
        .authorize_child(token.as_str(), &caller, input.child_id, AccessScope::Parent)
        .await?;

    state.proxy.analyze_behavior(&input.summary).await
}
