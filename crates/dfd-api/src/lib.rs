//! Axum HTTP API server.
//!
//! This crate provides:
//! - The single upload page
//! - Upload and URL analysis endpoints
//! - PDF report export
//! - Rate limiting, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AnalysisService, AnalysisSettings, Directories};
pub use state::AppState;
