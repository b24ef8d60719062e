//! Health, readiness and metrics endpoints on a real listener.

mod common;

use common::{test_config, Family};
use insight_service::config::InsightConfig;
use insight_service::services::providers::mock::ScriptedChatProvider;
use insight_service::startup::Application;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app(config: InsightConfig) -> u16 {
    service_core::observability::init_metrics();

    let app = Application::build_with(
        config,
        Arc::new(Family::new().store()),
        Arc::new(ScriptedChatProvider::replying("{}")),
    )
    .await
    .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app(test_config()).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "insight-service");
}

#[tokio::test]
async fn readiness_follows_gateway_key() {
    let port = spawn_app(test_config()).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/ready", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let mut config = test_config();
    config.gateway.api_key = None;
    let port = spawn_app(config).await;

    let response = client
        .get(format!("http://127.0.0.1:{}/ready", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn metrics_are_exposed() {
    let port = spawn_app(test_config()).await;
    let client = Client::new();

    // one request so the HTTP counters exist
    client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .get(format!("http://127.0.0.1:{}/metrics", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("http_requests_total"));
}
