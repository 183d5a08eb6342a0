//! Analysis API handlers.
//!
//! Both entry points return an [`AnalysisReport`]: the lines shown on the
//! page plus the predictor's raw outcome.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use dfd_models::{extract_youtube_id, AnalysisReport};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field that carries the video.
pub const UPLOAD_FIELD: &str = "file";

/// Request to analyze a video by URL.
#[derive(Debug, Deserialize, Validate)]
pub struct YoutubeRequest {
    #[validate(url(message = "must be a valid URL"))]
    pub url: String,
}

/// Save an uploaded video and analyze it.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisReport>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Upload is missing a file name"))?;
        let bytes = field.bytes().await.map_err(|e| {
            warn!(file_name = %file_name, error = %e, "Failed to read upload");
            ApiError::bad_request("Failed to read upload")
        })?;

        info!(file_name = %file_name, size_bytes = bytes.len(), "Received upload");
        let report = state.analysis.analyze_upload(&file_name, &bytes).await?;
        return Ok(Json(report));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

/// Download a video from a URL and analyze it.
pub async fn analyze_youtube(
    State(state): State<AppState>,
    Json(request): Json<YoutubeRequest>,
) -> ApiResult<Json<AnalysisReport>> {
    let request = YoutubeRequest {
        url: request.url.trim().to_string(),
    };
    if request.url.is_empty() {
        return Err(ApiError::bad_request("URL must not be empty"));
    }
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    match extract_youtube_id(&request.url) {
        Ok(video_id) => info!(url = %request.url, video_id = %video_id, "Analyzing YouTube video"),
        // yt-dlp handles many other sites
        Err(_) => info!(url = %request.url, "Analyzing video from URL"),
    }
    let report = state.analysis.analyze_url(&request.url).await?;
    Ok(Json(report))
}
