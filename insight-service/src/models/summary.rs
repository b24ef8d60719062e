//! Aggregated activity shapes exchanged with the browser client.
//!
//! Field names follow the client's JSON (`topEmotion`, `emotionData`, ...).

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSummary {
    #[validate(length(min = 1, max = 128))]
    pub top_emotion: String,
    pub count: u32,
    #[serde(default)]
    #[validate(length(max = 8), custom(function = "validate_labels"))]
    pub others: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    #[validate(length(min = 1, max = 128))]
    pub top_food: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    #[validate(length(min = 1, max = 128))]
    pub top_game: String,
    pub count: u32,
}

/// The three aggregates the behavior analysis is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSummary {
    #[serde(rename = "emotionData")]
    pub emotion: EmotionSummary,
    #[serde(rename = "foodData")]
    pub food: FoodSummary,
    #[serde(rename = "gameData")]
    pub game: GameSummary,
}

fn validate_labels(labels: &[String]) -> Result<(), validator::ValidationError> {
    if labels.iter().all(|l| !l.trim().is_empty() && l.chars().count() <= 128) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("label"))
    }
}
