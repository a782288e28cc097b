//! qiraat-ui - Analyzer page microservice
//!
//! **Module Identity:**
//! - Name: qiraat-ui (User Interface)
//! - Default bind: 127.0.0.1:5771
//!
//! Serves the analyzer page and forwards identification requests to the
//! classification endpoint (qiraat-id).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qiraat_common::config::{CliOverrides, ServiceConfig};
use qiraat_ui::capture::ObjectUrlStore;
use qiraat_ui::{
    build_router, AppState, ClassificationClient, SessionStore, SESSION_IDLE_TIMEOUT,
    SESSION_SWEEP_INTERVAL,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for qiraat-ui
#[derive(Parser, Debug)]
#[command(name = "qiraat-ui")]
#[command(about = "Qiraat recitation analyzer page")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Classification endpoint URL
    #[arg(long)]
    predict_url: Option<String>,

    /// Classification request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

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
        ui_bind: args.bind,
        predict_url: args.predict_url,
        request_timeout_secs: args.timeout_secs,
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
        "Starting Qiraat Analyzer UI (qiraat-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let client = ClassificationClient::new(config.predict_url.clone(), config.request_timeout)
        .context("Failed to build classification client")?;
    info!(
        "Classification endpoint: {} (timeout {}s)",
        client.predict_url(),
        config.request_timeout.as_secs()
    );

    let sessions = SessionStore::new(ObjectUrlStore::new());
    spawn_session_sweeper(sessions.clone());

    let app = build_router(AppState::new(sessions, client));

    let listener = tokio::net::TcpListener::bind(config.ui_bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.ui_bind))?;
    info!("qiraat-ui listening on http://{}", config.ui_bind);
    info!("Health check: http://{}/health", config.ui_bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically tear down abandoned sessions so their audio is released
fn spawn_session_sweeper(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.sweep_idle(SESSION_IDLE_TIMEOUT).await;
        }
    });
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
