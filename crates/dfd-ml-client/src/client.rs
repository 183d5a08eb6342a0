//! ML service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use dfd_models::PredictionOutcome;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{MlError, MlResult};
use crate::predictor::{ModelLoader, Predictor};
use crate::types::{HealthResponse, LoadModelRequest, ModelHandle, PredictionRequest};

/// Configuration for ML client.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of ML service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each attempt
    pub retry_base_delay: Duration,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(600), // frame sampling on CPU is slow
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ML_SERVICE_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(
                std::env::var("ML_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_base_delay: defaults.retry_base_delay,
        }
    }
}

/// Client for the prediction service.
#[derive(Debug, Clone)]
pub struct MlClient {
    http: Client,
    config: MlClientConfig,
}

impl MlClient {
    /// Create a new ML client.
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    pub fn config(&self) -> &MlClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Check if ML service is healthy.
    pub async fn health_check(&self) -> MlResult<bool> {
        let url = self.url("/health");

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("ML service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("ML service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// POST a JSON body and decode a JSON reply, retrying transient failures.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> MlResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("Sending request to {}", url);

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| self.map_send_error(e))?;
                check_status(response).await
            })
            .await?;

        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&text).map_err(|e| {
            MlError::InvalidResponse(format!("could not decode {} response: {}", path, e))
        })
    }

    fn map_send_error(&self, error: reqwest::Error) -> MlError {
        if error.is_timeout() {
            MlError::Timeout(self.config.timeout.as_secs())
        } else {
            MlError::Network(error)
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    warn!(
                        "ML request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Turn non-2xx replies into typed errors.
async fn check_status(response: Response) -> MlResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("ML service returned {}: {}", status, body);

    Err(match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            MlError::ServiceUnavailable(message)
        }
        StatusCode::NOT_FOUND => MlError::ModelNotLoaded(message),
        _ => MlError::RequestFailed(message),
    })
}

#[async_trait]
impl ModelLoader for MlClient {
    async fn load_model(&self, model_path: &str, fp16: bool) -> MlResult<ModelHandle> {
        let request = LoadModelRequest {
            model_path: model_path.to_string(),
            fp16,
        };

        let handle: ModelHandle = self.post_json("/models/load", &request).await?;
        info!(
            model_id = %handle.model_id,
            model_path = %handle.model_path,
            fp16 = handle.fp16,
            "Loaded detection model"
        );
        Ok(handle)
    }
}

#[async_trait]
impl Predictor for MlClient {
    async fn predict(&self, request: &PredictionRequest) -> MlResult<PredictionOutcome> {
        self.post_json("/predict", request).await
    }

    async fn is_ready(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfd_models::{ResultRecord, Verdict};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MlClient {
        MlClient::new(MlClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(10),
        })
        .unwrap()
    }

    fn model() -> ModelHandle {
        ModelHandle {
            model_id: "cvit-1".to_string(),
            model_path: "cvit2_deepfake_detection_ep_50.pth".to_string(),
            fp16: false,
        }
    }

    fn outcome_body() -> serde_json::Value {
        json!({
            "result": {"video": {
                "name": ["a.mp4"],
                "pred": [0.91],
                "klass": ["uncategorized"],
                "pred_label": ["FAKE"],
                "correct_label": [0]
            }},
            "accuracy": 0.0,
            "count": 1,
            "pred": [0, 0.91]
        })
    }

    #[test]
    fn test_config_defaults() {
        let config = MlClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert_eq!(config.max_retries, 2);
    }

    #[tokio::test]
    async fn test_load_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/load"))
            .and(body_partial_json(json!({
                "model_path": "cvit2_deepfake_detection_ep_50.pth",
                "fp16": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model_id": "cvit-1",
                "model_path": "cvit2_deepfake_detection_ep_50.pth",
                "fp16": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = client_for(&server)
            .load_model("cvit2_deepfake_detection_ep_50.pth", false)
            .await
            .unwrap();
        assert_eq!(handle, model());
    }

    #[tokio::test]
    async fn test_predict_sends_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({
                "video_path": "uploads/a.mp4",
                "model_id": "cvit-1",
                "num_frames": 15,
                "klass": "uncategorized",
                "correct_label": 0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(outcome_body()))
            .expect(1)
            .mount(&server)
            .await;

        let request = PredictionRequest::new("uploads/a.mp4", &model(), false, ResultRecord::new(), 15);
        let outcome = client_for(&server).predict(&request).await.unwrap();

        assert_eq!(outcome.verdict(), Ok(Verdict::Fake));
        assert_eq!(outcome.result.len(), 1);
        assert_eq!(outcome.count, 1);
    }

    #[tokio::test]
    async fn test_predict_retries_unavailable_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(outcome_body()))
            .mount(&server)
            .await;

        let request = PredictionRequest::new("uploads/a.mp4", &model(), false, ResultRecord::new(), 15);
        let outcome = client_for(&server).predict(&request).await.unwrap();
        assert_eq!(outcome.result.video.name, vec!["a.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_predict_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad video path"))
            .expect(1)
            .mount(&server)
            .await;

        let request = PredictionRequest::new("uploads/a.mp4", &model(), false, ResultRecord::new(), 15);
        let err = client_for(&server).predict(&request).await.unwrap_err();

        match err {
            MlError::RequestFailed(msg) => assert!(msg.contains("bad video path")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_predict_unknown_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = PredictionRequest::new("uploads/a.mp4", &model(), false, ResultRecord::new(), 15);
        let err = client_for(&server).predict(&request).await.unwrap_err();
        assert!(matches!(err, MlError::ModelNotLoaded(_)));
    }

    #[tokio::test]
    async fn test_predict_malformed_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"unexpected\": true}"))
            .mount(&server)
            .await;

        let request = PredictionRequest::new("uploads/a.mp4", &model(), false, ResultRecord::new(), 15);
        let err = client_for(&server).predict(&request).await.unwrap_err();
        assert!(matches!(err, MlError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_predict_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(outcome_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = MlClient::new(MlClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(200),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(10),
        })
        .unwrap();

        let request = PredictionRequest::new("uploads/a.mp4", &model(), false, ResultRecord::new(), 15);
        let err = client.predict(&request).await.unwrap_err();
        assert!(matches!(err, MlError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "version": "1.0"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.health_check().await.unwrap());
        assert!(client.is_ready().await);
    }
}
