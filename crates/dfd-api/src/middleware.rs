//! API middleware.

use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderName, HeaderValue, Request, Response};
use axum::middleware::Next;
use axum::response::IntoResponse;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn, Span};
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics;

/// Rate limiter keyed by client IP.
pub type IpRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Client count above which idle limiter state is pruned.
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Per-IP request quota shared by the `/api` routes.
pub struct ClientRateLimiter {
    limiter: IpRateLimiter,
    trust_proxy_headers: bool,
}

impl ClientRateLimiter {
    /// Create a limiter allowing `requests_per_second` per client. A rate of
    /// zero is treated as one.
    pub fn new(requests_per_second: u32) -> Self {
        let quota =
            Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::keyed(quota),
            trust_proxy_headers: false,
        }
    }

    /// Key clients by `X-Forwarded-For`/`X-Real-IP` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Take one request from `ip`'s quota. Returns false when it is exhausted.
    pub fn check(&self, ip: IpAddr) -> bool {
        if self.limiter.len() >= MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
            debug!(clients = self.limiter.len(), "Pruned idle rate limiter state");
        }
        self.limiter.check_key(&ip).is_ok()
    }

    /// Number of clients with live limiter state.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Create CORS layer.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    use axum::http::{header, Method};

    let allowed_headers = [header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN];

    let exposed_headers = [
        header::CONTENT_LENGTH,
        header::CONTENT_TYPE,
        header::CONTENT_DISPOSITION,
        HeaderName::from_static(crate::handlers::REPORT_PATH_HEADER),
    ];

    let allowed_methods = [Method::GET, Method::POST, Method::OPTIONS];

    if origins.iter().any(|o| o == "*") {
        // Wildcard origin: no credentials, so Any is allowed everywhere
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
            .allow_origin(Any)
            .max_age(std::time::Duration::from_secs(600))
    } else {
        // tower-http panics if credentials are combined with wildcard headers
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .expose_headers(exposed_headers)
            .allow_credentials(true)
            .allow_origin(origins)
            .max_age(std::time::Duration::from_secs(600))
    }
}

/// Security headers middleware.
pub async fn security_headers(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-XSS-Protection", HeaderValue::from_static("1; mode=block"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static(
            "accelerometer=(), camera=(), geolocation=(), gyroscope=(), magnetometer=(), microphone=(), payment=(), usb=()",
        ),
    );
    headers.insert(
        "Cross-Origin-Resource-Policy",
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        "X-Permitted-Cross-Domain-Policies",
        HeaderValue::from_static("none"),
    );

    response
}

/// Request ID middleware.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response<Body> {
    let request_id = request
        .headers()
        .get("X-Request-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(request_id.clone());

    Span::current().record("request_id", &request_id);

    let mut response = next.run(request).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-ID", header_value);
    }

    response
}

/// Request logging middleware.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed();

    // Probes would drown everything else
    if !matches!(uri.path(), "/health" | "/healthz" | "/ready" | "/metrics") {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Rate limiting middleware using IP-based rate limiter.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<ClientRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if let Some(ip) = extract_client_ip(&request, rate_limiter.trust_proxy_headers) {
        if !rate_limiter.check(ip) {
            warn!(ip = %ip, "Rate limit exceeded");
            metrics::record_rate_limit_hit(request.uri().path());
            return ApiError::RateLimited.into_response();
        }
    }

    next.run(request).await
}

/// Extract client IP from connection info, or from proxy headers when they
/// are trusted.
fn extract_client_ip(request: &Request<Body>, trust_proxy_headers: bool) -> Option<IpAddr> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip());
    if !trust_proxy_headers {
        return peer;
    }

    // First hop of X-Forwarded-For is the original client
    if let Some(ip) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok())
    {
        return Some(ip);
    }

    if let Some(ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
    {
        return Some(ip);
    }

    peer
}
