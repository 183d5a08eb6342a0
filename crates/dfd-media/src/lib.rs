//! Video intake for the deepfake detection service.
//!
//! This crate provides:
//! - Writing uploaded bytes into the upload directory
//! - Downloading videos from URLs with yt-dlp
//! - FFprobe inspection and video validation

pub mod download;
pub mod error;
pub mod probe;
pub mod upload;
pub mod validate;

pub use download::{VideoDownloader, YtDlpDownloader};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use upload::{safe_file_name, save_upload};
pub use validate::{FfprobeValidator, VideoValidator};
