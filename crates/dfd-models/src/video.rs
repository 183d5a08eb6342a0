//! Video sources and local video files.

use std::fmt;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Extensions accepted by the upload picker.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mpeg", "mpg"];

/// Check a file name against [`ALLOWED_EXTENSIONS`], ignoring case.
pub fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Where a video came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoSource {
    /// Uploaded through the file picker
    Upload { file_name: String },
    /// Downloaded from a URL
    Url { url: String },
}

impl VideoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSource::Upload { .. } => "upload",
            VideoSource::Url { .. } => "url",
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::Upload { file_name } => write!(f, "upload:{}", file_name),
            VideoSource::Url { url } => write!(f, "url:{}", url),
        }
    }
}

/// A local video file owned for the duration of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoFile {
    pub path: PathBuf,
    pub source: VideoSource,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>, source: VideoSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// Final path component, or the whole path if it has none.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("clip.mp4"));
        assert!(has_allowed_extension("CLIP.MOV"));
        assert!(has_allowed_extension("archive.tar.mpg"));
        assert!(!has_allowed_extension("clip.mkv"));
        assert!(!has_allowed_extension("mp4"));
        assert!(!has_allowed_extension(""));
    }

    #[test]
    fn test_video_file_name() {
        let file = VideoFile::new(
            "uploads/interview.mp4",
            VideoSource::Upload {
                file_name: "interview.mp4".to_string(),
            },
        );
        assert_eq!(file.file_name(), "interview.mp4");
    }

    #[test]
    fn test_source_serialization() {
        let source = VideoSource::Url {
            url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["kind"], "url");
        assert_eq!(source.as_str(), "url");
    }
}
