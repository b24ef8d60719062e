//! In-memory record store for tests.

use super::{RecordStore, StoreError};
use crate::models::{ActivityLogs, CallerIdentity, ChildRecord, ParentRecord};
use crate::services::activity::ActivityWindow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

/// Tokens, children, parents and activity registered up front; every lookup is counted.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tokens: RwLock<HashMap<String, CallerIdentity>>,
    children: RwLock<HashMap<Uuid, ChildRecord>>,
    parents: RwLock<Vec<ParentRecord>>,
    activity: RwLock<HashMap<Uuid, ActivityLogs>>,
    identity_down: bool,
    records_down: bool,
    identity_lookups: AtomicUsize,
    child_lookups: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the database were down.
    pub fn unavailable() -> Self {
        Self {
            identity_down: true,
            records_down: true,
            ..Self::default()
        }
    }

    /// Tokens still resolve, but table reads fail.
    pub fn with_records_unavailable(self) -> Self {
        Self {
            records_down: true,
            ..self
        }
    }

    pub fn with_user(self, token: &str, user_id: &str) -> Self {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(
                token.to_string(),
                CallerIdentity {
                    id: user_id.to_string(),
                    email: None,
                },
            );
        }
        self
    }

    pub fn with_parent(self, parent_id: Uuid, user_id: &str) -> Self {
        if let Ok(mut parents) = self.parents.write() {
            parents.push(ParentRecord {
                id: parent_id,
                user_id: user_id.to_string(),
            });
        }
        self
    }

    pub fn with_child(self, child_id: Uuid, user_id: &str, parent_id: Option<Uuid>) -> Self {
        if let Ok(mut children) = self.children.write() {
            children.insert(
                child_id,
                ChildRecord {
                    id: child_id,
                    user_id: user_id.to_string(),
                    parent_id,
                },
            );
        }
        self
    }

    pub fn with_activity(self, child_id: Uuid, logs: ActivityLogs) -> Self {
        if let Ok(mut activity) = self.activity.write() {
            activity.insert(child_id, logs);
        }
        self
    }

    pub fn identity_lookups(&self) -> usize {
        self.identity_lookups.load(Ordering::SeqCst)
    }

    pub fn child_lookups(&self) -> usize {
        self.child_lookups.load(Ordering::SeqCst)
    }

    fn check_available(&self, down: bool) -> Result<(), StoreError> {
        if down {
            Err(StoreError::Unavailable("mock store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, StoreError> {
        self.identity_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available(self.identity_down)?;
        self.tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.get(token).cloned())
            .ok_or(StoreError::Unauthenticated)
    }

    async fn find_child(
        &self,
        _token: &str,
        child_id: Uuid,
    ) -> Result<Option<ChildRecord>, StoreError> {
        self.child_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available(self.records_down)?;
        Ok(self
            .children
            .read()
            .ok()
            .and_then(|children| children.get(&child_id).cloned()))
    }

    async fn find_parent_by_user(
        &self,
        _token: &str,
        user_id: &str,
    ) -> Result<Option<ParentRecord>, StoreError> {
        self.check_available(self.records_down)?;
        Ok(self
            .parents
            .read()
            .ok()
            .and_then(|parents| parents.iter().find(|p| p.user_id == user_id).cloned()))
    }

    async fn recent_activity(
        &self,
        _token: &str,
        child_id: Uuid,
        _window: &ActivityWindow,
    ) -> Result<ActivityLogs, StoreError> {
        self.check_available(self.records_down)?;
        Ok(self
            .activity
            .read()
            .ok()
            .and_then(|activity| activity.get(&child_id).cloned())
            .unwrap_or_default())
    }
}
