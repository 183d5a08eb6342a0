//! Analysis orchestration.
//!
//! Turns an uploaded file or a URL into a [`VideoFile`], validates it, runs
//! the predictor once and collects the lines shown to the user.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;

use dfd_media::{save_upload, safe_file_name, VideoDownloader, VideoValidator};
use dfd_ml_client::{ModelHandle, PredictionRequest, Predictor};
use dfd_models::analysis::{invalid_video_message, prediction_line, processing_line};
use dfd_models::{
    has_allowed_extension, AnalysisId, AnalysisReport, ResultRecord, VideoFile, VideoSource,
    ALLOWED_EXTENSIONS,
};
use dfd_report::{render_text, write_report};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::logging::AnalysisLogger;
use crate::metrics;

pub const UPLOAD_SUCCESS_LINE: &str = "Video uploaded successfully.";
pub const DOWNLOAD_START_LINE: &str = "Downloading YouTube video...";
pub const DOWNLOAD_SUCCESS_LINE: &str = "YouTube video downloaded successfully.";

/// Per-prediction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Frames sampled from each video
    pub num_frames: u32,
    /// Half-precision inference
    pub fp16: bool,
}

impl AnalysisSettings {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            num_frames: config.num_frames,
            fp16: config.model_fp16,
        }
    }
}

/// Working directories for videos and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub upload: PathBuf,
    pub download: PathBuf,
    pub result: PathBuf,
}

impl Directories {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            upload: config.upload_dir.clone(),
            download: config.download_dir.clone(),
            result: config.result_dir.clone(),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.upload, &self.download, &self.result]
    }

    /// Create every directory that does not exist yet.
    pub async fn create_all(&self) -> std::io::Result<()> {
        for dir in self.all() {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Directories that are missing or not directories.
    pub fn missing(&self) -> Vec<&Path> {
        self.all().into_iter().filter(|dir| !dir.is_dir()).collect()
    }
}

/// Runs analyses against a model loaded once at startup.
pub struct AnalysisService {
    predictor: Arc<dyn Predictor>,
    validator: Arc<dyn VideoValidator>,
    downloader: Arc<dyn VideoDownloader>,
    model: ModelHandle,
    settings: AnalysisSettings,
    dirs: Directories,
}

impl AnalysisService {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        validator: Arc<dyn VideoValidator>,
        downloader: Arc<dyn VideoDownloader>,
        model: ModelHandle,
        settings: AnalysisSettings,
        dirs: Directories,
    ) -> Self {
        Self {
            predictor,
            validator,
            downloader,
            model,
            settings,
            dirs,
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn settings(&self) -> AnalysisSettings {
        self.settings
    }

    pub fn dirs(&self) -> &Directories {
        &self.dirs
    }

    /// Whether the prediction backend is reachable.
    pub async fn predictor_ready(&self) -> bool {
        self.predictor.is_ready().await
    }

    /// Save an uploaded file and analyze it.
    pub async fn analyze_upload(&self, file_name: &str, bytes: &[u8]) -> ApiResult<AnalysisReport> {
        let file_name = safe_file_name(file_name)?;
        if !has_allowed_extension(&file_name) {
            return Err(ApiError::bad_request(format!(
                "Unsupported file type: {}. Allowed extensions: {}",
                file_name,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let id = AnalysisId::new();
        let source = VideoSource::Upload {
            file_name: file_name.clone(),
        };
        let logger = AnalysisLogger::new(&id, &source);

        let path = save_upload(&self.dirs.upload, &file_name, bytes)
            .await
            .inspect_err(|e| {
                metrics::record_analysis_failure(source.as_str(), "upload");
                logger.log_error(&e.to_string());
            })?;
        metrics::record_upload_bytes(bytes.len());
        logger.log_start(&format!("saved {} bytes to {}", bytes.len(), path.display()));

        let video = VideoFile::new(path, source);
        self.analyze_with(id, &video, vec![UPLOAD_SUCCESS_LINE.to_string()])
            .await
    }

    /// Download a video from `url` and analyze it.
    pub async fn analyze_url(&self, url: &str) -> ApiResult<AnalysisReport> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ApiError::bad_request("URL must not be empty"));
        }

        let id = AnalysisId::new();
        let source = VideoSource::Url {
            url: url.to_string(),
        };
        let logger = AnalysisLogger::new(&id, &source);
        logger.log_start("downloading");

        let start = Instant::now();
        let path = self
            .downloader
            .download(url, &self.dirs.download)
            .await
            .inspect_err(|e| {
                metrics::record_analysis_failure(source.as_str(), "download");
                logger.log_error(&e.to_string());
            })?;
        metrics::record_download_duration(start.elapsed().as_secs_f64());
        logger.log_progress(&format!("downloaded to {}", path.display()));

        let video = VideoFile::new(path, source);
        let lines = vec![
            DOWNLOAD_START_LINE.to_string(),
            DOWNLOAD_SUCCESS_LINE.to_string(),
        ];
        self.analyze_with(id, &video, lines).await
    }

    /// Validate `video` and, if it is a video, predict whether it is real.
    ///
    /// Every call starts from an empty [`ResultRecord`]. A file rejected by
    /// the validator yields a report with `valid == false` and the predictor
    /// is not called.
    pub async fn analyze_video(&self, video: &VideoFile) -> ApiResult<AnalysisReport> {
        self.analyze_with(AnalysisId::new(), video, Vec::new()).await
    }

    async fn analyze_with(
        &self,
        id: AnalysisId,
        video: &VideoFile,
        mut lines: Vec<String>,
    ) -> ApiResult<AnalysisReport> {
        let logger = AnalysisLogger::new(&id, &video.source);
        let span = logger.create_span();

        async move {
            let source = video.source.as_str();
            let video_name = video.file_name();

            if !self.validator.is_video(&video.path).await {
                let message = invalid_video_message(&video.path);
                logger.log_warning(&message);
                metrics::record_invalid_video(source);
                lines.push(message.clone());

                return Ok(AnalysisReport {
                    analysis_id: id,
                    source: video.source.clone(),
                    video_name,
                    valid: false,
                    message: Some(message),
                    lines,
                    result_lines: Vec::new(),
                    outcome: None,
                    analyzed_at: Utc::now(),
                });
            }

            lines.push(processing_line(&video_name));
            logger.log_progress(&format!("predicting {}", video_name));

            let request = PredictionRequest::new(
                video.path.to_string_lossy(),
                &self.model,
                self.settings.fp16,
                ResultRecord::new(),
                self.settings.num_frames,
            );

            let start = Instant::now();
            let outcome = self.predictor.predict(&request).await.inspect_err(|e| {
                metrics::record_analysis_failure(source, "prediction");
                logger.log_error(&e.to_string());
            })?;
            metrics::record_prediction_duration(start.elapsed().as_secs_f64());

            let verdict = outcome.verdict().map_err(|e| {
                metrics::record_analysis_failure(source, "prediction");
                ApiError::Upstream(format!("predictor returned {}", e))
            })?;
            let result_lines = render_text(&outcome.result).map_err(|e| {
                metrics::record_analysis_failure(source, "prediction");
                ApiError::Upstream(format!("predictor returned {}", e))
            })?;
            lines.push(prediction_line(outcome.confidence(), verdict));
            metrics::record_analysis(source, verdict.as_str());
            logger.log_completion(&format!("{} {}", verdict, outcome.confidence()));

            Ok(AnalysisReport {
                analysis_id: id,
                source: video.source.clone(),
                video_name,
                valid: true,
                message: None,
                lines,
                result_lines,
                outcome: Some(outcome),
                analyzed_at: Utc::now(),
            })
        }
        .instrument(span)
        .await
    }

    /// Render `result` as a PDF into the result directory.
    pub async fn generate_report(&self, result: &ResultRecord) -> ApiResult<(PathBuf, Vec<u8>)> {
        let report = write_report(&self.dirs.result, &self.model.model_path, result).await?;
        metrics::record_report_generated();
        Ok(report)
    }
}
