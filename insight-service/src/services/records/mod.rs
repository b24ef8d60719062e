//! Access to the hosted record store: identity resolution and the child,
//! parent and activity rows the endpoints consult.
//!
//! The store is an oracle only; nothing here writes.

pub mod mock;
pub mod postgrest;

use crate::models::{ActivityLogs, CallerIdentity, ChildRecord, ParentRecord};
use crate::services::activity::ActivityWindow;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use postgrest::PostgrestRecordStore;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the caller's token.
    #[error("Token rejected by record store")]
    Unauthenticated,

    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected record store response: {0}")]
    Malformed(String),
}

/// Queries run with the caller's token so the store's row-level policies apply.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve a bearer token to the user it was issued for.
    async fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, StoreError>;

    async fn find_child(
        &self,
        token: &str,
        child_id: Uuid,
    ) -> Result<Option<ChildRecord>, StoreError>;

    /// The parent profile belonging to a user, if the user is a parent.
    async fn find_parent_by_user(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<ParentRecord>, StoreError>;

    async fn recent_activity(
        &self,
        token: &str,
        child_id: Uuid,
        window: &ActivityWindow,
    ) -> Result<ActivityLogs, StoreError>;
}
