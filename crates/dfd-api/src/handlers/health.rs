//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub predictor: CheckStatus,
    pub directories: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: Option<u64>) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the prediction service and the working directories.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    use std::time::Instant;

    let predictor_check = {
        let start = Instant::now();
        if state.analysis.predictor_ready().await {
            CheckStatus::ok(Some(start.elapsed().as_millis() as u64))
        } else {
            CheckStatus::error("prediction service unavailable")
        }
    };

    let directories_check = {
        let missing = state.analysis.dirs().missing();
        if missing.is_empty() {
            CheckStatus::ok(None)
        } else {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            CheckStatus::error(format!("missing: {}", names.join(", ")))
        }
    };

    let all_ok = predictor_check.is_ok() && directories_check.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            predictor: predictor_check,
            directories: directories_check,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
