//! FFprobe video information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
    /// File size in bytes
    pub size: u64,
    /// Bitrate in bits/second
    pub bitrate: u64,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    /// Set for cover art, which ffprobe reports as a one-frame video stream
    #[serde(default)]
    disposition: Option<FfprobeDisposition>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

impl FfprobeStream {
    fn is_moving_picture(&self) -> bool {
        self.codec_type == "video"
            && self
                .disposition
                .as_ref()
                .map(|d| d.attached_pic == 0)
                .unwrap_or(true)
    }
}

/// Probe a video file for information.
///
/// Fails with [`MediaError::InvalidVideo`] when the container holds no
/// video stream.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe exited with {}", output.status),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Build [`VideoInfo`] from ffprobe's JSON output.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.is_moving_picture())
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let size = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let bitrate = probe
        .format
        .bit_rate
        .as_ref()
        .and_then(|b| b.parse::<u64>().ok())
        .unwrap_or(0);

    // avg_frame_rate is "0/0" for some streams; fall back to r_frame_rate
    let fps = video_stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video_stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        size,
        bitrate,
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}
