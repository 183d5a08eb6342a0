//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::{analyze_youtube, generate_report, health, index, ready, upload_video};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    ClientRateLimiter,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let rate_limiter = Arc::new(
        ClientRateLimiter::new(state.config.rate_limit_rps)
            .trust_proxy_headers(state.config.trust_proxy_headers),
    );

    let api_routes = Router::new()
        .route("/upload", post(upload_video))
        .route("/youtube", post(analyze_youtube))
        .route("/report", post(generate_report))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .route("/", get(index))
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Multipart uploads are otherwise capped at axum's 2 MB default
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout,
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
