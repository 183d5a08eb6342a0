//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while materializing or inspecting a video.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }
}
