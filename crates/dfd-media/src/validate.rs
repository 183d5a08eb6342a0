//! Video validation.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::MediaError;
use crate::probe::probe_video;

/// Decides whether a path denotes a usable video.
#[async_trait]
pub trait VideoValidator: Send + Sync {
    async fn is_video(&self, path: &Path) -> bool;
}

/// Validator backed by ffprobe: a file is a video when it exists and holds
/// at least one moving-picture stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeValidator;

impl FfprobeValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VideoValidator for FfprobeValidator {
    async fn is_video(&self, path: &Path) -> bool {
        match probe_video(path).await {
            Ok(info) => {
                info!(
                    path = %path.display(),
                    codec = %info.codec,
                    width = info.width,
                    height = info.height,
                    duration_secs = info.duration,
                    "Video validated"
                );
                true
            }
            Err(MediaError::FfprobeNotFound) => {
                // Without ffprobe nothing can be validated
                error!("ffprobe not found in PATH, rejecting {}", path.display());
                false
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Not a valid video");
                false
            }
        }
    }
}
