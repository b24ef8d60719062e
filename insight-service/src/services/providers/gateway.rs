//! OpenAI-compatible chat-completions gateway.
//!
//! Sends `POST {base_url}/chat/completions` with the gateway key as bearer
//! credential and reads the first choice of the reply.

use super::{
    ChatCompletion, ChatMessage, ChatProvider, ChatRequest, ProviderError, ResponseSchema,
    TokenUsage,
};
use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;

pub struct GatewayChatProvider {
    client: Client,
    endpoint: String,
    api_key: Option<Secret<String>>,
    model: String,
}

impl GatewayChatProvider {
    pub fn new(config: &GatewayConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchema<'a>,
}

#[derive(Serialize)]
struct JsonSchema<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

impl<'a> From<&'a ResponseSchema> for ResponseFormat<'a> {
    fn from(schema: &'a ResponseSchema) -> Self {
        Self {
            kind: "json_schema",
            json_schema: JsonSchema {
                name: &schema.name,
                strict: true,
                schema: &schema.schema,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl ChatProvider for GatewayChatProvider {
    fn name(&self) -> &'static str {
        "gateway"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, ProviderError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("MODEL_GATEWAY_API_KEY is not set".to_string())
        })?;

        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            response_format: request.response_schema.as_ref().map(ResponseFormat::from),
        };

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            structured = request.response_schema.is_some(),
            "Sending request to model gateway"
        );

        let response = self
            .client
            .traced_post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate(&error_text, 512),
                "Model gateway returned an error"
            );
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
                StatusCode::PAYMENT_REQUIRED => ProviderError::PaymentRequired,
                other => ProviderError::ApiError {
                    status: other.as_u16(),
                },
            });
        }

        let reply: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid body: {}", e)))?;

        let usage = reply.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices".to_string()))?;

        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no message content".to_string()))?;

        Ok(ChatCompletion {
            content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
