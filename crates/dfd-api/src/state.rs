//! Application state.

use std::sync::Arc;

use dfd_media::{FfprobeValidator, YtDlpDownloader};
use dfd_ml_client::{MlClient, ModelLoader};
use tracing::info;

use crate::config::ApiConfig;
use crate::services::{AnalysisService, AnalysisSettings, Directories};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analysis: Arc<AnalysisService>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Loads the configured model once through the prediction service and
    /// creates the working directories when `create_dirs` is set.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let dirs = Directories::from_config(&config);
        if config.create_dirs {
            dirs.create_all().await?;
        }

        let client = Arc::new(MlClient::from_env()?);
        let model = client
            .load_model(&config.model_path, config.model_fp16)
            .await?;
        info!(
            model_id = %model.model_id,
            model_path = %model.model_path,
            fp16 = model.fp16,
            "Model loaded"
        );

        let analysis = AnalysisService::new(
            client,
            Arc::new(FfprobeValidator::new()),
            Arc::new(YtDlpDownloader::from_env()),
            model,
            AnalysisSettings::from_config(&config),
            dirs,
        );

        Ok(Self::with_service(config, analysis))
    }

    /// Build state around an already assembled service.
    pub fn with_service(config: ApiConfig, analysis: AnalysisService) -> Self {
        Self {
            config,
            analysis: Arc::new(analysis),
        }
    }
}
