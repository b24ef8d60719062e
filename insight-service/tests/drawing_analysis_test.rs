//! End-to-end behavior of `POST /drawing-analysis`.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::{test_config, Family, TestApp, CHILD_TOKEN, PARENT_TOKEN, STRANGER_TOKEN};
use insight_service::config::DEFAULT_MAX_IMAGE_BYTES;
use insight_service::services::providers::mock::ScriptedChatProvider;
use insight_service::services::providers::{ContentPart, MessageContent, ProviderError};
use serde_json::{json, Value};
use uuid::Uuid;

const ANALYSIS: &str = "Bright yellows and wide open shapes suggest a joyful, energetic mood.";

fn png_data_url(bytes: usize) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(vec![0x89u8; bytes]))
}

fn body(child_id: Uuid, image: &str) -> Value {
    json!({ "imageData": image, "child_id": child_id.to_string() })
}

#[tokio::test]
async fn missing_authorization_is_401_without_model_call() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));

    let response = app
        .post_json("/drawing-analysis", None, &body(family.child_id, &png_data_url(16)))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Unauthorized");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn owner_gets_verbatim_analysis() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));
    let image = png_data_url(64);

    let response = app
        .post_json("/drawing-analysis", Some(CHILD_TOKEN), &body(family.child_id, &image))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "analysis": ANALYSIS }));
    assert_eq!(app.provider.calls(), 1);

    let sent = app.provider.last_request().unwrap();
    match &sent.messages[0].content {
        MessageContent::Parts(parts) => match &parts[1] {
            ContentPart::ImageUrl { image_url } => assert_eq!(image_url.url, image),
            other => panic!("expected image part, got {other:?}"),
        },
        other => panic!("expected multimodal content, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_child_is_404() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));

    let response = app
        .post_json(
            "/drawing-analysis",
            Some(CHILD_TOKEN),
            &body(Uuid::new_v4(), &png_data_url(16)),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Child not found");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn parent_is_not_the_owner() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));

    let response = app
        .post_json(
            "/drawing-analysis",
            Some(PARENT_TOKEN),
            &body(family.child_id, &png_data_url(16)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "Unauthorized access to child data");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn oversized_image_is_400_whatever_the_relationship() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));
    let image = "a".repeat(DEFAULT_MAX_IMAGE_BYTES + 1);

    for token in [CHILD_TOKEN, STRANGER_TOKEN] {
        let response = app
            .post_json("/drawing-analysis", Some(token), &body(family.child_id, &image))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{token}");
        assert_eq!(response.error(), "Payload too large");
    }
    assert_eq!(app.store.child_lookups(), 0);
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn image_at_ceiling_is_accepted() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));
    let image = "a".repeat(DEFAULT_MAX_IMAGE_BYTES);

    let response = app
        .post_json("/drawing-analysis", Some(CHILD_TOKEN), &body(family.child_id, &image))
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn body_over_transport_limit_is_payload_too_large() {
    let family = Family::new();
    let mut config = test_config();
    config.limits.body_limit_bytes = 1024;
    let app = TestApp::with_config(config, family.store(), ScriptedChatProvider::replying(ANALYSIS));

    let response = app
        .post_json(
            "/drawing-analysis",
            Some(CHILD_TOKEN),
            &body(family.child_id, &png_data_url(4096)),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Payload too large");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn non_string_image_is_400() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));

    for image in [json!(null), json!(42), json!(""), json!({ "url": "x" })] {
        let payload = json!({ "imageData": image, "child_id": family.child_id.to_string() });
        let response = app
            .post_json("/drawing-analysis", Some(CHILD_TOKEN), &payload)
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{image}");
        assert_eq!(response.error(), "Invalid image data");
    }
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn missing_child_id_is_400() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));

    let response = app
        .post_json(
            "/drawing-analysis",
            Some(CHILD_TOKEN),
            &json!({ "imageData": png_data_url(8) }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Invalid child_id");
}

#[tokio::test]
async fn gateway_failure_is_500_with_status_only() {
    let family = Family::new();
    let app = TestApp::new(
        family.store(),
        ScriptedChatProvider::failing(|| ProviderError::ApiError { status: 502 }),
    );

    let response = app
        .post_json(
            "/drawing-analysis",
            Some(CHILD_TOKEN),
            &body(family.child_id, &png_data_url(16)),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "Model gateway error: 502");
}

#[tokio::test]
async fn empty_model_reply_is_500() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(""));

    let response = app
        .post_json(
            "/drawing-analysis",
            Some(CHILD_TOKEN),
            &body(family.child_id, &png_data_url(16)),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response
        .error()
        .starts_with("Could not parse model response"));
}

#[tokio::test]
async fn preflight_ignores_authorization() {
    let family = Family::new();
    let app = TestApp::new(family.store(), ScriptedChatProvider::replying(ANALYSIS));

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/drawing-analysis")
                .header("authorization", "Bearer forged")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert_eq!(response.headers["access-control-allow-origin"], "*");
    assert_eq!(app.store.identity_lookups(), 0);
    assert_eq!(app.provider.calls(), 0);
}
