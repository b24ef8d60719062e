//! Record store backed by the hosted database's auth and REST endpoints.

use super::{RecordStore, StoreError};
use crate::config::RecordStoreConfig;
use crate::models::{ActivityLogs, CallerIdentity, ChildRecord, ParentRecord};
use crate::services::activity::ActivityWindow;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use std::time::Instant;
use uuid::Uuid;

/// Lookups against `/auth/v1` and `/rest/v1`.
#[derive(Clone)]
pub struct PostgrestRecordStore {
    client: Client,
    base_url: String,
    anon_key: Secret<String>,
}

#[derive(Debug, Deserialize)]
struct EmotionRow {
    emotion_type: String,
}

#[derive(Debug, Deserialize)]
struct ChoiceRow {
    choice_value: String,
}

#[derive(Debug, Deserialize)]
struct ProgressRow {
    activity_type: String,
}

impl PostgrestRecordStore {
    pub fn new(config: &RecordStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.rest_url(table);
        let started = Instant::now();

        let response = self
            .client
            .traced_get(&url)
            .query(query)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %table, error = %e, "Record store request failed");
                StoreError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(
            table = %table,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Record store select"
        );

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "{} query returned {}",
                table, status
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::Malformed(format!("{}: {}", table, e)))
    }
}

#[async_trait]
impl RecordStore for PostgrestRecordStore {
    async fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, StoreError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .client
            .traced_get(&url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity lookup failed");
                StoreError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status.is_client_error() {
            return Err(StoreError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "identity lookup returned {}",
                status
            )));
        }

        let caller: CallerIdentity = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("user: {}", e)))?;

        if caller.id.is_empty() {
            return Err(StoreError::Malformed("user without id".to_string()));
        }
        Ok(caller)
    }

    async fn find_child(
        &self,
        token: &str,
        child_id: Uuid,
    ) -> Result<Option<ChildRecord>, StoreError> {
        let rows: Vec<ChildRecord> = self
            .select(
                token,
                "children",
                &[
                    ("select", "id,user_id,parent_id".to_string()),
                    ("id", format!("eq.{}", child_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn find_parent_by_user(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<ParentRecord>, StoreError> {
        let rows: Vec<ParentRecord> = self
            .select(
                token,
                "parents",
                &[
                    ("select", "id,user_id".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn recent_activity(
        &self,
        token: &str,
        child_id: Uuid,
        window: &ActivityWindow,
    ) -> Result<ActivityLogs, StoreError> {
        let child_filter = format!("eq.{}", child_id);
        let limit = window.recent_limit.to_string();

        let emotion_query = [
            ("select", "emotion_type".to_string()),
            ("child_id", child_filter.clone()),
            (
                "created_at",
                format!(
                    "gte.{}",
                    window.since.to_rfc3339_opts(SecondsFormat::Millis, true)
                ),
            ),
        ];
        let choice_query = [
            ("select", "choice_value".to_string()),
            ("child_id", child_filter.clone()),
            ("choice_type", "eq.food".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.clone()),
        ];
        let progress_query = [
            ("select", "activity_type".to_string()),
            ("child_id", child_filter),
            ("order", "created_at.desc".to_string()),
            ("limit", limit),
        ];

        let (emotions, choices, progress) = tokio::try_join!(
            self.select::<EmotionRow>(token, "emotion_logs", &emotion_query),
            self.select::<ChoiceRow>(token, "choice_logs", &choice_query),
            self.select::<ProgressRow>(token, "progress_entries", &progress_query),
        )?;

        Ok(ActivityLogs {
            emotions: emotions.into_iter().map(|r| r.emotion_type).collect(),
            food_choices: choices.into_iter().map(|r| r.choice_value).collect(),
            activities: progress.into_iter().map(|r| r.activity_type).collect(),
        })
    }
}
