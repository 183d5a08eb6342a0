//! Video download using yt-dlp.
//!
//! yt-dlp is asked to print the final file path after post-processing, and
//! that path is returned to the caller. The download directory is never
//! listed to guess which file was just written.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Output template relative to the download directory.
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Minimum size for a valid cookies file (bytes).
const MIN_COOKIES_FILE_SIZE: u64 = 50;

/// Fetches a video from a URL into a directory.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Download `url` into `output_dir` and return the path of the written file.
    async fn download(&self, url: &str, output_dir: &Path) -> MediaResult<PathBuf>;
}

/// [`VideoDownloader`] that shells out to yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    /// Binary name or path
    binary: PathBuf,
    /// yt-dlp format selector
    format: String,
    /// Netscape cookies file for sites that require a login
    cookies_path: Option<PathBuf>,
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            format: "best".to_string(),
            cookies_path: None,
        }
    }
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from environment variables (`YTDLP_BINARY`, `YTDLP_FORMAT`,
    /// `YTDLP_COOKIES`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            binary: std::env::var("YTDLP_BINARY")
                .map(PathBuf::from)
                .unwrap_or(defaults.binary),
            format: std::env::var("YTDLP_FORMAT").unwrap_or(defaults.format),
            cookies_path: std::env::var("YTDLP_COOKIES").ok().map(PathBuf::from),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_cookies(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookies_path = Some(path.into());
        self
    }

    /// Build the yt-dlp argument list for one download.
    fn build_args(&self, url: &str, output_dir: &Path, cookies: Option<&Path>) -> Vec<String> {
        let template = output_dir.join(OUTPUT_TEMPLATE);

        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
        ];

        if let Some(cookies) = cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        // Terminate option parsing so a URL starting with '-' is not a flag
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Return the configured cookies file if it looks usable.
    async fn usable_cookies(&self) -> Option<&Path> {
        let path = self.cookies_path.as_deref()?;

        match tokio::fs::read_to_string(path).await {
            Ok(content) if (content.len() as u64) < MIN_COOKIES_FILE_SIZE => {
                debug!("Cookies file {} is too small, skipping", path.display());
                None
            }
            Ok(content) if !is_valid_netscape_cookies(&content) => {
                debug!(
                    "Cookies file {} is not in Netscape format, skipping",
                    path.display()
                );
                None
            }
            Ok(_) => Some(path),
            Err(e) => {
                warn!("Failed to read cookies file {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, output_dir: &Path) -> MediaResult<PathBuf> {
        which::which(&self.binary).map_err(|_| MediaError::YtDlpNotFound)?;

        info!(url = %url, output_dir = %output_dir.display(), "Downloading video");

        let cookies = self.usable_cookies().await;
        let args = self.build_args(url, output_dir, cookies);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);

            let error_msg = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("Unknown error");

            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                error_msg
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = parse_printed_path(&stdout)
            .ok_or_else(|| MediaError::download_failed("yt-dlp did not report an output file"))?;

        if !path.exists() {
            return Err(MediaError::download_failed(format!(
                "Output file not created: {}",
                path.display()
            )));
        }

        let file_size = path.metadata()?.len();
        info!(
            output = %path.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );

        Ok(path)
    }
}

/// The filepath yt-dlp prints is the last non-empty stdout line.
fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Validate that a cookies file appears to be in Netscape format.
///
/// Netscape cookies files either start with "# Netscape HTTP Cookie File"
/// or contain tab-separated lines with domain entries.
fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File")
        || content.starts_with("# HTTP Cookie File")
    {
        return true;
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .any(|line| line.split('\t').count() >= 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let downloader = YtDlpDownloader::new();
        let args = downloader.build_args(
            "https://youtu.be/dQw4w9WgXcQ",
            Path::new("downloads"),
            None,
        );

        let format_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format_pos + 1], "best");

        let output_pos = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[output_pos + 1], "downloads/%(title)s.%(ext)s");

        let print_pos = args.iter().position(|a| a == "--print").unwrap();
        assert_eq!(args[print_pos + 1], "after_move:filepath");

        assert_eq!(args.last().unwrap(), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(args[args.len() - 2], "--");
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn test_build_args_with_cookies() {
        let downloader = YtDlpDownloader::new().with_format("bestvideo+bestaudio");
        let args = downloader.build_args(
            "https://youtu.be/x",
            Path::new("downloads"),
            Some(Path::new("/tmp/cookies.txt")),
        );

        let cookies_pos = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[cookies_pos + 1], "/tmp/cookies.txt");
        assert!(args.contains(&"bestvideo+bestaudio".to_string()));
    }

    #[test]
    fn test_parse_printed_path() {
        assert_eq!(
            parse_printed_path("[info] something\ndownloads/My Video.mp4\n\n"),
            Some(PathBuf::from("downloads/My Video.mp4"))
        );
        assert_eq!(parse_printed_path("\n  \n"), None);
    }

    #[test]
    fn test_netscape_cookie_detection() {
        assert!(is_valid_netscape_cookies("# Netscape HTTP Cookie File\n"));
        assert!(is_valid_netscape_cookies(
            ".youtube.com\tTRUE\t/\tTRUE\t0\tPREF\tf1=50000000"
        ));
        assert!(!is_valid_netscape_cookies("{\"cookies\": []}"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let downloader = YtDlpDownloader::new().with_binary("/nonexistent/yt-dlp");
        let err = downloader
            .download("https://youtu.be/x", Path::new("downloads"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::YtDlpNotFound));
    }

    #[cfg(unix)]
    mod with_fake_binary {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn write_script(dir: &Path, body: &str) -> PathBuf {
            let script = dir.join("fake-yt-dlp");
            std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            script
        }

        #[tokio::test]
        async fn test_download_returns_printed_path() {
            let bin_dir = TempDir::new().unwrap();
            let out_dir = TempDir::new().unwrap();
            // A stale file that directory listing could have picked up
            std::fs::write(out_dir.path().join("aaa-older.mp4"), b"old").unwrap();

            let target = out_dir.path().join("Fresh Video.mp4");
            let script = write_script(
                bin_dir.path(),
                &format!(
                    "printf 'data' > '{0}'\necho '{0}'",
                    target.display()
                ),
            );

            let downloader = YtDlpDownloader::new().with_binary(script);
            let path = downloader
                .download("https://youtu.be/dQw4w9WgXcQ", out_dir.path())
                .await
                .unwrap();

            assert_eq!(path, target);
        }

        #[tokio::test]
        async fn test_download_failure_reports_last_stderr_line() {
            let bin_dir = TempDir::new().unwrap();
            let out_dir = TempDir::new().unwrap();
            let script = write_script(
                bin_dir.path(),
                "echo 'ERROR: Video unavailable' >&2\nexit 1",
            );

            let downloader = YtDlpDownloader::new().with_binary(script);
            let err = downloader
                .download("https://youtu.be/gone", out_dir.path())
                .await
                .unwrap_err();

            match err {
                MediaError::DownloadFailed { message } => {
                    assert!(message.contains("Video unavailable"), "{}", message)
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_download_without_output_file_fails() {
            let bin_dir = TempDir::new().unwrap();
            let out_dir = TempDir::new().unwrap();
            let script = write_script(bin_dir.path(), "echo '/nonexistent/never-written.mp4'");

            let downloader = YtDlpDownloader::new().with_binary(script);
            let err = downloader
                .download("https://youtu.be/x", out_dir.path())
                .await
                .unwrap_err();

            assert!(matches!(err, MediaError::DownloadFailed { .. }));
        }
    }
}
