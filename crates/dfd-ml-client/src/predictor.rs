//! Prediction seams.

use async_trait::async_trait;
use dfd_models::PredictionOutcome;

use crate::error::MlResult;
use crate::types::{ModelHandle, PredictionRequest};

/// Loads model weights once so predictions can reuse them.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load_model(&self, model_path: &str, fp16: bool) -> MlResult<ModelHandle>;
}

/// Classifies one video as real or fake.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> MlResult<PredictionOutcome>;

    /// Whether the predictor can currently serve requests.
    async fn is_ready(&self) -> bool {
        true
    }
}
