pub mod analysis;

pub use analysis::{
    ActivitySummaryQuery, BehaviorAnalysisInput, BehaviorAnalysisRequest, BehaviorPortrait,
    DrawingAnalysis, DrawingAnalysisInput, DrawingAnalysisRequest,
};
