//! Shared data models for the deepfake detection service.
//!
//! This crate provides Serde-serializable types for:
//! - The predictor's per-video result record
//! - Verdicts and prediction outcomes
//! - Video sources and the files they materialize
//! - The analysis report returned to the page

pub mod analysis;
pub mod prediction;
pub mod result;
pub mod utils;
pub mod video;

// Re-export common types
pub use analysis::{format_score, AnalysisId, AnalysisReport};
pub use prediction::{PredictedClass, PredictionOutcome, Verdict, VerdictError};
pub use result::{ResultRecord, ResultShapeError, VideoColumns, VideoEntry};
pub use utils::{extract_youtube_id, is_youtube_url, YoutubeIdError, YoutubeIdResult};
pub use video::{has_allowed_extension, VideoFile, VideoSource, ALLOWED_EXTENSIONS};
