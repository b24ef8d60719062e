//! Caller authentication and child-access checks.
//!
//! Runs before any model call. Identity comes from the record store's auth
//! endpoint; the relationship check compares the child row against either the
//! caller's parent profile or the caller's own user id.

use crate::error::AnalysisError;
use crate::models::{CallerIdentity, ChildRecord};
use crate::services::metrics;
use crate::services::records::{RecordStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Which relationship grants access to a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Caller must be the parent linked to the child.
    Parent,
    /// Caller must be the user the child profile belongs to.
    Child,
}

#[derive(Clone)]
pub struct AuthorizationGate {
    store: Arc<dyn RecordStore>,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolve a bearer token; any failure to resolve is Unauthorized.
    pub async fn authenticate(&self, token: &str) -> Result<CallerIdentity, AnalysisError> {
        match self.store.resolve_caller(token).await {
            Ok(caller) => Ok(caller),
            Err(e) => {
                if matches!(e, StoreError::Unauthenticated) {
                    tracing::warn!("Bearer token rejected");
                } else {
                    tracing::error!(error = %e, "Identity resolution failed");
                }
                metrics::record_denial("unauthenticated");
                Err(AnalysisError::Unauthorized)
            }
        }
    }

    pub async fn authorize_child(
        &self,
        token: &str,
        caller: &CallerIdentity,
        child_id: Uuid,
        scope: AccessScope,
    ) -> Result<ChildRecord, AnalysisError> {
        let child = self
            .store
            .find_child(token, child_id)
            .await
            .map_err(|e| store_failure("child lookup", e))?
            .ok_or_else(|| {
                tracing::warn!(child_id = %child_id, "Child not found");
                AnalysisError::NotFound
            })?;

        let allowed = match scope {
            AccessScope::Child => child.user_id == caller.id,
            AccessScope::Parent => {
                let parent = self
                    .store
                    .find_parent_by_user(token, &caller.id)
                    .await
                    .map_err(|e| store_failure("parent lookup", e))?;
                match (parent, child.parent_id) {
                    (Some(parent), Some(parent_id)) => parent.id == parent_id,
                    _ => false,
                }
            }
        };

        if !allowed {
            let reason = match scope {
                AccessScope::Parent => "not_parent",
                AccessScope::Child => "not_owner",
            };
            tracing::warn!(
                child_id = %child_id,
                caller_id = %caller.id,
                reason,
                "Child access denied"
            );
            metrics::record_denial(reason);
            return Err(AnalysisError::Forbidden);
        }

        Ok(child)
    }
}

fn store_failure(operation: &str, err: StoreError) -> AnalysisError {
    match err {
        // token was accepted moments ago; a later rejection is still the caller's credential
        StoreError::Unauthenticated => AnalysisError::Unauthorized,
        other => {
            tracing::error!(operation, error = %other, "Record store failure");
            AnalysisError::Upstream("Failed to verify child access".to_string())
        }
    }
}
