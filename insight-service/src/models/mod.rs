//! Domain models for the insight service.

pub mod records;
pub mod summary;

pub use records::{ActivityLogs, CallerIdentity, ChildRecord, ParentRecord};
pub use summary::{BehaviorSummary, EmotionSummary, FoodSummary, GameSummary};
