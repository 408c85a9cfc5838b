// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::query_pipeline::QueryPipeline;
use crate::domain::decoration::decoration_by_name;
use crate::infrastructure::config::load_config;
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{dashboard, health_check, range_bounds};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config().context("Failed to load garden configuration")?;

    // One store client for the process lifetime (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(&config.influx));

    // Create services (application layer)
    let decoration = decoration_by_name(&config.dashboard.decoration)
        .with_context(|| format!("Unknown decoration '{}'", config.dashboard.decoration))?;
    let dashboard_service = DashboardService::new(
        QueryPipeline::new(repository),
        config.groups.clone(),
        Arc::from(decoration),
        config.dashboard.decoration_group.clone(),
    );

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        range_bounds: config.dashboard.range_bounds(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/range", get(range_bounds))
        .route("/dashboard", get(dashboard))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
    tracing::info!(
        "Starting garden-telemetry on {} (bucket {}, {} signal groups)",
        addr,
        config.influx.bucket,
        config.groups.len()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router, and with it the store client, is dropped once serve returns
    tracing::info!("garden-telemetry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
