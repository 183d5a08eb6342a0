//! ML client error types.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("ML service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MlError {
    /// Whether the request never reached a working predictor. A timed-out
    /// prediction may still be running and is not resubmitted.
    pub fn is_retryable(&self) -> bool {
        match self {
            MlError::ServiceUnavailable(_) => true,
            MlError::Network(e) => e.is_connect(),
            _ => false,
        }
    }
}
