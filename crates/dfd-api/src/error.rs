//! API error types.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use dfd_media::MediaError;
use dfd_ml_client::MlError;
use dfd_report::ReportError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Prediction error: {0}")]
    Prediction(#[from] MlError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Media(e) => match e {
                MediaError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
                MediaError::DownloadFailed { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Prediction(e) => match e {
                MlError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Report(e) => match e {
                ReportError::MalformedResult(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if self.is_internal()
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = Json(ErrorResponse { detail });

        if matches!(self, ApiError::RateLimited) {
            return (status, [(header::RETRY_AFTER, "1")], body).into_response();
        }
        (status, body).into_response()
    }
}
