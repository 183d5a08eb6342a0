//! ML service request/response types.

use serde::{Deserialize, Serialize};
use dfd_models::ResultRecord;

/// Class every ad-hoc analysis is submitted under.
pub const UNCATEGORIZED_CLASS: &str = "uncategorized";

/// Ground-truth label sent when the real answer is unknown.
pub const UNKNOWN_CORRECT_LABEL: u32 = 0;

/// Request to load model weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadModelRequest {
    pub model_path: String,
    pub fp16: bool,
}

/// A model loaded by the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Service-side identifier passed back on every prediction
    pub model_id: String,
    /// Weights file the model was loaded from
    pub model_path: String,
    /// Whether the model runs in half precision
    #[serde(default)]
    pub fp16: bool,
}

/// One prediction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Path to the video, readable by the prediction service
    pub video_path: String,
    /// Model to run
    pub model_id: String,
    /// Half-precision inference
    pub fp16: bool,
    /// Accumulator the service appends this video to
    pub result: ResultRecord,
    /// Number of frames sampled from the video
    pub num_frames: u32,
    /// Network variant; unused by the CViT predictor
    pub net: Option<String>,
    /// Class the video is filed under
    pub klass: String,
    /// Ground-truth label
    pub correct_label: u32,
}

impl PredictionRequest {
    /// Build a request with the fixed class and ground-truth placeholders.
    pub fn new(
        video_path: impl Into<String>,
        model: &ModelHandle,
        fp16: bool,
        result: ResultRecord,
        num_frames: u32,
    ) -> Self {
        Self {
            video_path: video_path.into(),
            model_id: model.model_id.clone(),
            fp16,
            result,
            num_frames,
            net: None,
            klass: UNCATEGORIZED_CLASS.to_string(),
            correct_label: UNKNOWN_CORRECT_LABEL,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
