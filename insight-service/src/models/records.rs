//! Rows read from the hosted record store.
//!
//! Only the columns the service needs are selected; everything else the
//! store returns is ignored on deserialization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The principal a bearer token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A child profile, owned by the child's own login and optionally linked to a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
    pub id: Uuid,
    pub user_id: String,
}

/// Raw activity values feeding the behavior summary, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLogs {
    /// `emotion_type` of every emotion log inside the look-back window.
    pub emotions: Vec<String>,
    /// `choice_value` of the most recent food choices.
    pub food_choices: Vec<String>,
    /// `activity_type` of the most recent progress entries.
    pub activities: Vec<String>,
}
