use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::config::ServerConfig;

pub const DEFAULT_LOG_FILTER: &str = "info,bookstore_service=debug";

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads `.env` if present. A missing file is not an error.
pub fn init_env() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!("Failed to load .env: {}", err),
    }
}

/// Binds the listener and serves `app` until the process is stopped.
pub async fn serve(service_name: &str, app: Router, server: &ServerConfig) -> Result<()> {
    let addr = server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("{} listening on {}", service_name, addr);
    axum::serve(listener, app.layer(TraceLayer::new_for_http()))
        .await
        .context("Server error")?;
    Ok(())
}
