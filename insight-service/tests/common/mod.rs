//! Shared setup for insight-service integration tests.
//!
//! Routers are built over the in-memory record store and the scripted chat
//! provider so every test can assert how many lookups and model calls a
//! request caused.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use insight_service::config::{
    CorsSettings, GatewayConfig, InsightConfig, LimitsConfig, RecordStoreConfig,
};
use insight_service::services::providers::mock::ScriptedChatProvider;
use insight_service::services::records::mock::InMemoryRecordStore;
use insight_service::{build_router, AppState};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const PARENT_TOKEN: &str = "parent-token";
pub const CHILD_TOKEN: &str = "child-token";
pub const STRANGER_TOKEN: &str = "stranger-token";

pub const PORTRAIT_REPLY: &str = r#"Sure! Here is what I see:
{"portrait": "A calm, curious child who enjoys routine.", "advice": ["Keep bedtime consistent", "Play memory games together", "Name feelings out loud"]}
Hope this helps."#;

pub fn test_config() -> InsightConfig {
    InsightConfig {
        common: service_core::config::Config { port: 0 },
        records: RecordStoreConfig {
            url: "http://records.invalid".to_string(),
            anon_key: Secret::new("anon-key".to_string()),
        },
        gateway: GatewayConfig {
            base_url: "http://gateway.invalid/v1".to_string(),
            api_key: Some(Secret::new("gateway-key".to_string())),
            model: "google/gemini-2.5-flash".to_string(),
            structured_output: true,
            timeout: None,
        },
        limits: LimitsConfig::default(),
        cors: CorsSettings::default(),
    }
}

/// Family fixture: one parent, one child linked to them, and an unrelated
/// user with their own parent profile.
pub struct Family {
    pub parent_id: Uuid,
    pub child_id: Uuid,
}

impl Family {
    pub fn new() -> Self {
        Self {
            parent_id: Uuid::new_v4(),
            child_id: Uuid::new_v4(),
        }
    }

    pub fn store(&self) -> InMemoryRecordStore {
        InMemoryRecordStore::new()
            .with_user(PARENT_TOKEN, "parent-user")
            .with_user(CHILD_TOKEN, "child-user")
            .with_user(STRANGER_TOKEN, "stranger-user")
            .with_parent(self.parent_id, "parent-user")
            .with_parent(Uuid::new_v4(), "stranger-user")
            .with_child(self.child_id, "child-user", Some(self.parent_id))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryRecordStore>,
    pub provider: Arc<ScriptedChatProvider>,
}

impl TestApp {
    pub fn new(store: InMemoryRecordStore, provider: ScriptedChatProvider) -> Self {
        Self::with_config(test_config(), store, provider)
    }

    pub fn with_config(
        config: InsightConfig,
        store: InMemoryRecordStore,
        provider: ScriptedChatProvider,
    ) -> Self {
        let store = Arc::new(store);
        let provider = Arc::new(provider);
        let state = AppState::new(config, store.clone(), provider.clone());
        Self {
            router: build_router(state),
            store,
            provider,
        }
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: bytes.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn error(&self) -> String {
        self.json()["error"]
            .as_str()
            .expect("no error message")
            .to_string()
    }
}
