//! Prompt construction and reply parsing around the chat provider.

use crate::dtos::{BehaviorPortrait, DrawingAnalysis};
use crate::error::AnalysisError;
use crate::models::BehaviorSummary;
use crate::services::metrics::{self, Endpoint};
use crate::services::providers::{
    ChatMessage, ChatProvider, ChatRequest, ContentPart, ImageUrl, ProviderError, ResponseSchema,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

const DRAWING_PROMPT: &str = "\
You are a child psychologist who practises art therapy with autistic children. \
Look at this drawing and describe what it suggests about the child's emotional state.

Take into account:
- Colours: warm tones often carry excitement or anxiety, cool tones calm or sadness, \
bright colours energy and dark colours heaviness.
- Shapes and patterns: chaotic or orderly, sharp or rounded.
- Composition: centred, scattered or squeezed into a corner; whether it fills the page.
- Line pressure: heavy strokes point to intensity, light strokes to gentleness or hesitation.
- Subjects: which objects or themes appear and what they might stand for.

Answer in 3-4 warm, empathetic sentences. Name the main emotions you notice, point to the \
elements of the drawing that show them, offer a supportive reading of what the child may be \
working through, and close with an encouraging note about how they express themselves. \
Parents will read this, so keep the tone gentle and professional.";

/// Talks to the model gateway on behalf of both analysis endpoints.
#[derive(Clone)]
pub struct ModelProxy {
    provider: Arc<dyn ChatProvider>,
    structured_output: bool,
}

impl ModelProxy {
    pub fn new(provider: Arc<dyn ChatProvider>, structured_output: bool) -> Self {
        Self {
            provider,
            structured_output,
        }
    }

    pub async fn analyze_behavior(
        &self,
        summary: &BehaviorSummary,
    ) -> Result<BehaviorPortrait, AnalysisError> {
        let request = ChatRequest {
            messages: vec![ChatMessage::user_text(behavior_prompt(summary))],
            response_schema: self.structured_output.then(portrait_schema),
        };

        let content = self.complete(Endpoint::Behavior, &request).await?;
        parse_portrait(&content).inspect_err(|e| {
            metrics::record_model_error(Endpoint::Behavior, "unparseable");
            tracing::error!(error = %e, reply_len = content.len(), "Behavior reply unusable");
        })
    }

    pub async fn analyze_drawing(&self, image_data: &str) -> Result<DrawingAnalysis, AnalysisError> {
        let request = ChatRequest {
            messages: vec![ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: DRAWING_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_data.to_string(),
                    },
                },
            ])],
            response_schema: None,
        };

        let content = self.complete(Endpoint::Drawing, &request).await?;
        if content.trim().is_empty() {
            metrics::record_model_error(Endpoint::Drawing, "empty_reply");
            return Err(AnalysisError::UpstreamParse("empty reply".to_string()));
        }

        Ok(DrawingAnalysis { analysis: content })
    }

    /// One call, no retry. Returns the reply text.
    async fn complete(
        &self,
        endpoint: Endpoint,
        request: &ChatRequest,
    ) -> Result<String, AnalysisError> {
        let started = Instant::now();
        let result = self.provider.complete(request).await;
        let elapsed = started.elapsed();
        metrics::record_model_latency(endpoint, elapsed);

        match result {
            Ok(completion) => {
                tracing::info!(
                    provider = self.provider.name(),
                    model = %self.provider.model(),
                    endpoint = endpoint.as_str(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
                    prompt_tokens = completion.usage.map(|u| u.prompt_tokens),
                    completion_tokens = completion.usage.map(|u| u.completion_tokens),
                    "Model call completed"
                );
                Ok(completion.content)
            }
            Err(e) => {
                metrics::record_model_error(endpoint, e.kind());
                tracing::error!(
                    provider = self.provider.name(),
                    endpoint = endpoint.as_str(),
                    error = %e,
                    "Model call failed"
                );
                Err(map_provider_error(e))
            }
        }
    }
}

fn map_provider_error(err: ProviderError) -> AnalysisError {
    match err {
        ProviderError::NotConfigured(_) => {
            AnalysisError::Config("Model gateway API key is not configured".to_string())
        }
        ProviderError::RateLimited => {
            AnalysisError::Upstream("Rate limited by model gateway".to_string())
        }
        ProviderError::PaymentRequired => {
            AnalysisError::Upstream("Model gateway credits exhausted".to_string())
        }
        ProviderError::ApiError { status } => {
            AnalysisError::Upstream(format!("Model gateway error: {}", status))
        }
        ProviderError::NetworkError(_) => {
            AnalysisError::Upstream("Model gateway unreachable".to_string())
        }
        ProviderError::MalformedResponse(detail) => AnalysisError::UpstreamParse(detail),
    }
}

fn behavior_prompt(summary: &BehaviorSummary) -> String {
    let others = if summary.emotion.others.is_empty() {
        "none".to_string()
    } else {
        summary.emotion.others.join(", ")
    };

    format!(
        "You are a child psychologist looking at a child's recent behaviour. From the data below, write:
1. A short psychological portrait of the child (2-3 sentences).
2. Practical advice for the parents on supporting the child emotionally (3-4 concrete suggestions).

Data:
- Most frequent emotion: {top_emotion} ({emotion_count} times over the last 7 days)
- Other emotions: {others}
- Most chosen food: {top_food} ({food_count} times)
- Most played game: {top_game} ({game_count} times)

Keep the tone warm and supportive so the parents understand their child better.

Reply with JSON only, in this shape:
{{
  \"portrait\": \"...\",
  \"advice\": [\"...\", \"...\", \"...\"]
}}",
        top_emotion = summary.emotion.top_emotion,
        emotion_count = summary.emotion.count,
        others = others,
        top_food = summary.food.top_food,
        food_count = summary.food.count,
        top_game = summary.game.top_game,
        game_count = summary.game.count,
    )
}

fn portrait_schema() -> ResponseSchema {
    ResponseSchema {
        name: "behavior_portrait".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "portrait": { "type": "string" },
                "advice": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["portrait", "advice"],
            "additionalProperties": false
        }),
    }
}

/// Strict parse first, then the first object embedded in free text.
///
/// Each `{` is tried in turn and one value is decoded from it, so prose
/// around the object (including later braces) is ignored.
fn parse_portrait(content: &str) -> Result<BehaviorPortrait, AnalysisError> {
    if let Ok(portrait) = serde_json::from_str::<BehaviorPortrait>(content.trim()) {
        return Ok(portrait);
    }

    let mut last_error = None;
    for (start, _) in content.match_indices('{') {
        let mut values =
            serde_json::Deserializer::from_str(&content[start..]).into_iter::<BehaviorPortrait>();
        match values.next() {
            Some(Ok(portrait)) => return Ok(portrait),
            Some(Err(e)) => {
                last_error.get_or_insert(e);
            }
            None => {}
        }
    }

    Err(AnalysisError::UpstreamParse(match last_error {
        Some(e) => e.to_string(),
        None => "no JSON object in reply".to_string(),
    }))
}
