use super::observe;
use crate::dtos::ActivitySummaryQuery;
use crate::error::AnalysisError;
use crate::middleware::BearerToken;
use crate::models::BehaviorSummary;
use crate::services::activity::{self, ActivityWindow};
use crate::services::metrics::Endpoint;
use crate::services::AccessScope;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

/// `GET /activity-summary?child_id=`: the aggregates `/behavior-analysis` expects,
/// computed from the child's recent logs.
#[tracing::instrument(skip_all, fields(child_id = tracing::field::Empty))]
pub async fn activity_summary(
    State(state): State<AppState>,
    token: BearerToken,
    Query(query): Query<ActivitySummaryQuery>,
) -> Result<Json<BehaviorSummary>, AnalysisError> {
    observe(Endpoint::ActivitySummary, run(&state, &token, &query).await).map(Json)
}

async fn run(
    state: &AppState,
    token: &BearerToken,
    query: &ActivitySummaryQuery,
) -> Result<BehaviorSummary, AnalysisError> {
    let caller = state.gate.authenticate(token.as_str()).await?;
    let child_id = query.child_id()?;
    tracing::Span::current().record("child_id", tracing::field::display(child_id));

    state
        .gate
        .authorize_child(token.as_str(), &caller, child_id, AccessScope::Parent)
        .await?;

    let logs = state
        .store
        .recent_activity(token.as_str(), child_id, &ActivityWindow::ending_at(Utc::now()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Activity lookup failed");
            AnalysisError::Upstream("Failed to load activity logs".to_string())
        })?;

    Ok(activity::summarize(&logs))
}
