//! Reduction of raw activity logs into the behavior summary.
//!
//! Each category is reduced the same way: count occurrences, order by count
//! (ties keep first-seen order, and logs arrive newest first), take the
//! leader and its count. Emotions also report up to three runners-up.

use crate::models::{ActivityLogs, BehaviorSummary, EmotionSummary, FoodSummary, GameSummary};
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_EMOTION: &str = "happy";
pub const DEFAULT_FOOD: &str = "No food choices yet";
pub const DEFAULT_GAME: &str = "No games played yet";

/// Emotion logs older than this are ignored.
pub const EMOTION_LOOKBACK_DAYS: i64 = 7;
/// Food choices and progress entries considered, newest first.
pub const RECENT_LIMIT: usize = 20;
const OTHER_EMOTIONS: usize = 3;

/// Which slice of history feeds a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub since: DateTime<Utc>,
    pub recent_limit: usize,
}

impl ActivityWindow {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            since: now - Duration::days(EMOTION_LOOKBACK_DAYS),
            recent_limit: RECENT_LIMIT,
        }
    }
}

pub fn summarize(logs: &ActivityLogs) -> BehaviorSummary {
    let emotions = ranked(logs.emotions.iter().map(String::as_str));
    let (top_emotion, emotion_count) = leader(&emotions, DEFAULT_EMOTION);
    let others = emotions
        .iter()
        .skip(1)
        .take(OTHER_EMOTIONS)
        .map(|(label, _)| label.clone())
        .collect();

    let foods = ranked(logs.food_choices.iter().map(String::as_str));
    let (top_food, food_count) = leader(&foods, DEFAULT_FOOD);

    let games: Vec<String> = logs
        .activities
        .iter()
        .map(|activity| activity.replace('_', " "))
        .collect();
    let games = ranked(games.iter().map(String::as_str));
    let (top_game, game_count) = leader(&games, DEFAULT_GAME);

    BehaviorSummary {
        emotion: EmotionSummary {
            top_emotion,
            count: emotion_count,
            others,
        },
        food: FoodSummary {
            top_food,
            count: food_count,
        },
        game: GameSummary {
            top_game,
            count: game_count,
        },
    }
}

/// Distinct non-blank labels with their counts, most frequent first.
fn ranked<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for value in values.filter(|value| !value.trim().is_empty()) {
        match counts.iter_mut().find(|(label, _)| label.as_str() == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn leader(ranked: &[(String, u32)], default: &str) -> (String, u32) {
    ranked
        .first()
        .cloned()
        .unwrap_or_else(|| (default.to_string(), 0))
}
