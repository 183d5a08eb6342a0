//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Weights file loaded at startup unless `MODEL_PATH` says otherwise.
pub const DEFAULT_MODEL_PATH: &str = "cvit2_deepfake_detection_ep_50.pth";

/// Frames sampled per video unless `NUM_FRAMES` says otherwise.
pub const DEFAULT_NUM_FRAMES: u32 = 15;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Rate limit by `X-Forwarded-For`/`X-Real-IP` instead of the peer address
    pub trust_proxy_headers: bool,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Where uploaded videos are written
    pub upload_dir: PathBuf,
    /// Where downloaded videos are written
    pub download_dir: PathBuf,
    /// Where exported reports are written
    pub result_dir: PathBuf,
    /// Create the three directories at startup
    pub create_dirs: bool,
    /// Pretrained weights loaded once at startup
    pub model_path: String,
    /// Half-precision inference
    pub model_fp16: bool,
    /// Frames sampled per video
    pub num_frames: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            trust_proxy_headers: false,
            request_timeout: Duration::from_secs(1800),
            max_body_size: 512 * 1024 * 1024, // 512MB
            environment: "development".to_string(),
            upload_dir: PathBuf::from("uploads"),
            download_dir: PathBuf::from("downloads"),
            result_dir: PathBuf::from("result"),
            create_dirs: true,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            model_fp16: false,
            num_frames: DEFAULT_NUM_FRAMES,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: parse_env("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: parse_env("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            trust_proxy_headers: parse_bool_env("TRUST_PROXY_HEADERS")
                .unwrap_or(defaults.trust_proxy_headers),
            request_timeout: parse_env("REQUEST_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_body_size: parse_env("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            download_dir: std::env::var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            result_dir: std::env::var("RESULT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.result_dir),
            create_dirs: parse_bool_env("CREATE_DIRS").unwrap_or(defaults.create_dirs),
            model_path: std::env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            model_fp16: parse_bool_env("MODEL_FP16").unwrap_or(defaults.model_fp16),
            num_frames: parse_env("NUM_FRAMES").unwrap_or(defaults.num_frames),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_bool_env(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfd_ml_client::{MlClientConfig, MlError};

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.result_dir, PathBuf::from("result"));
        assert_eq!(config.model_path, "cvit2_deepfake_detection_ep_50.pth");
        assert_eq!(config.num_frames, 15);
        assert!(!config.model_fp16);
        assert!(!config.trust_proxy_headers);
        assert!(!config.is_production());
    }

    #[test]
    fn test_request_timeout_outlasts_prediction() {
        let config = ApiConfig::default();
        let ml = MlClientConfig::default();

        // Backoff between retries of unavailable-service replies
        let backoff: Duration = (0..ml.max_retries)
            .map(|attempt| ml.retry_base_delay * 2u32.pow(attempt))
            .sum();

        assert!(!MlError::Timeout(ml.timeout.as_secs()).is_retryable());
        assert!(config.request_timeout > ml.timeout + backoff);
    }
}
