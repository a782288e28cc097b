//! qiraat-id - Classification endpoint microservice
//!
//! **Module Identity:**
//! - Name: qiraat-id (Identification)
//! - Default bind: 127.0.0.1:5770
//!
//! Serves `POST /predict` for the analyzer page (qiraat-ui). Predictions
//! currently come from the mock classifier.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use qiraat_common::config::{CliOverrides, ServiceConfig};
use qiraat_id::{build_router, AppState, MockClassifier};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for qiraat-id
#[derive(Parser, Debug)]
#[command(name = "qiraat-id")]
#[command(about = "Qiraat classification endpoint")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&CliOverrides {
        config_file: args.config,
        log_level: args.log_level,
        id_bind: args.bind,
        ..Default::default()
    });

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting Qiraat Identification (qiraat-id) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let classifier = Arc::new(MockClassifier::new());
    info!("Classifier: mock ({} fixed readings)", classifier.choices().len());

    let app = build_router(AppState::new(classifier));

    let listener = tokio::net::TcpListener::bind(config.id_bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.id_bind))?;
    info!("qiraat-id listening on http://{}", config.id_bind);
    info!("Health check: http://{}/health", config.id_bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
