//! Request and response bodies of the analysis endpoints.
//!
//! Bodies are read as loose JSON first so each missing or mistyped field maps
//! to the message the browser client expects, rather than to a generic
//! deserialization failure.

use crate::error::{
    AnalysisError, INVALID_CHILD_ID, INVALID_IMAGE_DATA, INVALID_SUMMARY_DATA,
    MISSING_REQUIRED_DATA,
};
use crate::models::{BehaviorSummary, EmotionSummary, FoodSummary, GameSummary};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /behavior-analysis`.
#[derive(Debug, Default, Deserialize)]
pub struct BehaviorAnalysisRequest {
    #[serde(rename = "emotionData", default)]
    pub emotion_data: Option<Value>,
    #[serde(rename = "foodData", default)]
    pub food_data: Option<Value>,
    #[serde(rename = "gameData", default)]
    pub game_data: Option<Value>,
    #[serde(default)]
    pub child_id: Option<Value>,
}

/// A behavior request that passed validation.
#[derive(Debug, Clone)]
pub struct BehaviorAnalysisInput {
    pub child_id: Uuid,
    pub summary: BehaviorSummary,
}

impl BehaviorAnalysisRequest {
    /// Decode the extractor result, mapping transport failures onto the taxonomy.
    pub fn from_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Self, AnalysisError> {
        let body = read_body(payload, MISSING_REQUIRED_DATA)?;
        serde_json::from_value(body).map_err(|_| AnalysisError::InvalidInput(MISSING_REQUIRED_DATA))
    }

    pub fn validate(self) -> Result<BehaviorAnalysisInput, AnalysisError> {
        let emotion: EmotionSummary = required(self.emotion_data)?;
        let food: FoodSummary = required(self.food_data)?;
        let game: GameSummary = required(self.game_data)?;
        let child_id = parse_child_id(self.child_id.as_ref())?;

        emotion
            .validate()
            .and_then(|_| food.validate())
            .and_then(|_| game.validate())
            .map_err(|e| {
                tracing::debug!(error = %e, "Behavior summary out of bounds");
                AnalysisError::InvalidInput(INVALID_SUMMARY_DATA)
            })?;

        Ok(BehaviorAnalysisInput {
            child_id,
            summary: BehaviorSummary {
                emotion,
                food,
                game,
            },
        })
    }
}

/// Successful behavior analysis, as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorPortrait {
    pub portrait: String,
    pub advice: Vec<String>,
}

/// Body of `POST /drawing-analysis`.
#[derive(Debug, Default, Deserialize)]
pub struct DrawingAnalysisRequest {
    #[serde(rename = "imageData", default)]
    pub image_data: Option<Value>,
    #[serde(default)]
    pub child_id: Option<Value>,
}

/// A drawing request that passed validation.
#[derive(Debug, Clone)]
pub struct DrawingAnalysisInput {
    pub child_id: Uuid,
    /// Data URL (or URL) of the drawing, forwarded untouched.
    pub image_data: String,
}

impl DrawingAnalysisRequest {
    pub fn from_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Self, AnalysisError> {
        let body = read_body(payload, INVALID_IMAGE_DATA)?;
        serde_json::from_value(body).map_err(|_| AnalysisError::InvalidInput(INVALID_IMAGE_DATA))
    }

    /// `max_image_bytes` bounds the encoded string length, not the decoded image.
    pub fn validate(self, max_image_bytes: usize) -> Result<DrawingAnalysisInput, AnalysisError> {
        let image_data = match self.image_data {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => return Err(AnalysisError::InvalidInput(INVALID_IMAGE_DATA)),
        };
        let child_id = parse_child_id(self.child_id.as_ref())?;

        if image_data.len() > max_image_bytes {
            tracing::warn!(
                encoded_len = image_data.len(),
                limit = max_image_bytes,
                "Drawing payload over size ceiling"
            );
            return Err(AnalysisError::PayloadTooLarge);
        }

        Ok(DrawingAnalysisInput {
            child_id,
            image_data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingAnalysis {
    pub analysis: String,
}

/// Query of `GET /activity-summary`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivitySummaryQuery {
    pub child_id: Option<String>,
}

impl ActivitySummaryQuery {
    pub fn child_id(&self) -> Result<Uuid, AnalysisError> {
        parse_uuid(self.child_id.as_deref())
    }
}

fn read_body(
    payload: Result<Json<Value>, JsonRejection>,
    generic: &'static str,
) -> Result<Value, AnalysisError> {
    match payload {
        Ok(Json(value @ Value::Object(_))) => Ok(value),
        Ok(Json(_)) => Err(AnalysisError::InvalidInput(generic)),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AnalysisError::PayloadTooLarge)
        }
        Err(rejection) => {
            tracing::debug!(rejection = %rejection.body_text(), "Unreadable request body");
            Err(AnalysisError::InvalidInput(generic))
        }
    }
}

fn required<T: DeserializeOwned>(value: Option<Value>) -> Result<T, AnalysisError> {
    match value {
        Some(Value::Null) | None => Err(AnalysisError::InvalidInput(MISSING_REQUIRED_DATA)),
        Some(v) => {
            serde_json::from_value(v).map_err(|_| AnalysisError::InvalidInput(MISSING_REQUIRED_DATA))
        }
    }
}

/// Child ids are the store's UUID keys; anything else is rejected before it
/// can reach a query filter.
pub fn parse_child_id(value: Option<&Value>) -> Result<Uuid, AnalysisError> {
    match value {
        Some(Value::String(s)) => parse_uuid(Some(s)),
        _ => Err(AnalysisError::InvalidInput(INVALID_CHILD_ID)),
    }
}

fn parse_uuid(raw: Option<&str>) -> Result<Uuid, AnalysisError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AnalysisError::InvalidInput(INVALID_CHILD_ID))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CHILD: &str = "7d4b2c1e-9a0f-4f5e-8a61-2b3c4d5e6f70";

    fn behavior(body: Value) -> Result<BehaviorAnalysisInput, AnalysisError> {
        BehaviorAnalysisRequest::from_body(Ok(Json(body)))?.validate()
    }

    fn full_behavior() -> Value {
        json!({
            "emotionData": { "topEmotion": "calm", "count": 5, "others": ["happy", "tired"] },
            "foodData": { "topFood": "apple", "count": 3 },
            "gameData": { "topGame": "memory game", "count": 4 },
            "child_id": CHILD
        })
    }

    #[test]
    fn accepts_complete_behavior_body() {
        let input = behavior(full_behavior()).unwrap();
        assert_eq!(input.child_id.to_string(), CHILD);
        assert_eq!(input.summary.emotion.top_emotion, "calm");
        assert_eq!(input.summary.emotion.others, vec!["happy", "tired"]);
        assert_eq!(input.summary.game.count, 4);
    }

    #[test]
    fn missing_summary_is_missing_required_data() {
        for key in ["emotionData", "foodData", "gameData"] {
            let mut body = full_behavior();
            body.as_object_mut().unwrap().remove(key);
            let err = behavior(body).unwrap_err();
            assert!(
                matches!(err, AnalysisError::InvalidInput(MISSING_REQUIRED_DATA)),
                "{key}"
            );
        }

        let mut body = full_behavior();
        body["foodData"] = Value::Null;
        assert!(matches!(
            behavior(body).unwrap_err(),
            AnalysisError::InvalidInput(MISSING_REQUIRED_DATA)
        ));
    }

    #[test]
    fn mistyped_summary_is_missing_required_data() {
        let mut body = full_behavior();
        body["gameData"] = json!({ "topGame": "tracing", "count": "many" });
        assert!(matches!(
            behavior(body).unwrap_err(),
            AnalysisError::InvalidInput(MISSING_REQUIRED_DATA)
        ));
    }

    #[test]
    fn others_defaults_to_empty() {
        let mut body = full_behavior();
        body["emotionData"] = json!({ "topEmotion": "happy", "count": 0 });
        assert!(behavior(body).unwrap().summary.emotion.others.is_empty());
    }

    #[test]
    fn child_id_must_be_uuid_string() {
        for bad in [json!(null), json!(42), json!(""), json!("child-1"), json!({})] {
            let mut body = full_behavior();
            body["child_id"] = bad.clone();
            assert!(
                matches!(
                    behavior(body).unwrap_err(),
                    AnalysisError::InvalidInput(INVALID_CHILD_ID)
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn oversized_labels_are_rejected() {
        let mut body = full_behavior();
        body["foodData"]["topFood"] = json!("x".repeat(129));
        assert!(matches!(
            behavior(body).unwrap_err(),
            AnalysisError::InvalidInput(INVALID_SUMMARY_DATA)
        ));

        let mut body = full_behavior();
        body["emotionData"]["others"] = json!(vec!["sad"; 9]);
        assert!(matches!(
            behavior(body).unwrap_err(),
            AnalysisError::InvalidInput(INVALID_SUMMARY_DATA)
        ));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = BehaviorAnalysisRequest::from_body(Ok(Json(json!([1, 2])))).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(MISSING_REQUIRED_DATA)));
    }

    fn drawing(body: Value, limit: usize) -> Result<DrawingAnalysisInput, AnalysisError> {
        DrawingAnalysisRequest::from_body(Ok(Json(body)))?.validate(limit)
    }

    #[test]
    fn drawing_requires_string_image() {
        for bad in [json!(null), json!(12), json!(""), json!(["data:"])] {
            let err = drawing(json!({ "imageData": bad, "child_id": CHILD }), 1024).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidInput(INVALID_IMAGE_DATA)));
        }
        let err = drawing(json!({ "child_id": CHILD }), 1024).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(INVALID_IMAGE_DATA)));
    }

    #[test]
    fn drawing_requires_child_id() {
        let err = drawing(json!({ "imageData": "data:image/png;base64,AAAA" }), 1024).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(INVALID_CHILD_ID)));
    }

    #[test]
    fn drawing_size_ceiling_is_inclusive() {
        let at_limit = "a".repeat(64);
        assert!(drawing(json!({ "imageData": at_limit, "child_id": CHILD }), 64).is_ok());

        let over = "a".repeat(65);
        assert!(matches!(
            drawing(json!({ "imageData": over, "child_id": CHILD }), 64).unwrap_err(),
            AnalysisError::PayloadTooLarge
        ));
    }

    #[test]
    fn query_child_id_is_trimmed() {
        let query = ActivitySummaryQuery {
            child_id: Some(format!(" {CHILD} ")),
        };
        assert_eq!(query.child_id().unwrap().to_string(), CHILD);
        assert!(ActivitySummaryQuery::default().child_id().is_err());
    }
}
