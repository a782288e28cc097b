//! qiraat-ui library - Analyzer page
//!
//! Lets a user upload or record a recitation clip, preview its waveform,
//! send it to the classification endpoint and review the last few results.
//! All per-browser state lives in an [`session::AnalyzerSession`] keyed by a
//! session cookie.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod capture;
pub mod client;
pub mod error;
pub mod presenter;
pub mod session;
pub mod waveform;

pub use crate::client::{ClassificationClient, ClientError};
pub use crate::error::{UiError, UiResult};
pub use crate::session::{AnalyzerSession, SessionError, SessionStore};

/// Largest accepted upload (25 MiB)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Sessions untouched for this long are torn down
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often idle sessions are swept
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live analyzer sessions and their playable URLs
    pub sessions: SessionStore,
    /// Client for the classification endpoint
    pub client: Arc<ClassificationClient>,
}

impl AppState {
    pub fn new(sessions: SessionStore, client: ClassificationClient) -> Self {
        Self {
            sessions,
            client: Arc::new(client),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/audio", post(api::upload_audio))
        .route("/identify", post(api::identify))
        .route("/blob/:id", get(api::serve_blob))
        .route("/playback/toggle", post(api::toggle_playback))
        .route("/playback/event/:signal", post(api::playback_event))
        .route("/session/end", post(api::end_session))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
