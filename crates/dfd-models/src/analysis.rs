//! Analysis report returned to the page.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prediction::{PredictionOutcome, Verdict};
use crate::video::VideoSource;

/// Unique identifier for one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnalysisId(pub String);

impl AnalysisId {
    /// Generate a new random analysis ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-screen lines and raw outcome of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub analysis_id: AnalysisId,
    pub source: VideoSource,
    /// File name of the analyzed video
    pub video_name: String,
    /// Whether the file passed video validation
    pub valid: bool,
    /// Rejection message when the file failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Text lines shown to the user, in display order
    pub lines: Vec<String>,
    /// The predictor's result record, one labelled line per field
    #[serde(default)]
    pub result_lines: Vec<String>,
    /// Predictor output (absent when the file was rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PredictionOutcome>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Predicted verdict, if the predictor ran and returned a known class.
    pub fn verdict(&self) -> Option<Verdict> {
        self.outcome.as_ref().and_then(|o| o.verdict().ok())
    }
}

/// Line shown before the predictor runs.
pub fn processing_line(video_name: &str) -> String {
    format!("Processing video: {}", video_name)
}

/// Format a score the way the predictor prints it: whole values keep a
/// trailing `.0`.
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 && score.abs() < 1e16 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}

/// Line shown with the predictor's answer.
pub fn prediction_line(confidence: f64, verdict: Verdict) -> String {
    format!("Prediction: {} {}", format_score(confidence), verdict)
}

/// Message shown when a file fails video validation.
pub fn invalid_video_message(path: &Path) -> String {
    format!(
        "Invalid video file: {}. Please provide a valid video file.",
        path.display()
    )
}
