//! Axum API server binary.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dfd_api::{create_router, metrics, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // rustls 0.23 needs an explicit process-wide crypto provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("dfd=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting dfd-api");

    let config = ApiConfig::from_env();
    info!(
        "API config: host={}, port={}, model={}, frames={}",
        config.host, config.port, config.model_path, config.num_frames
    );

    let state = AppState::new(config.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create application state: {}", e))?;

    let metrics_enabled = std::env::var("METRICS_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    let metrics_handle = if metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
