//! qiraat-id library - Classification endpoint
//!
//! Receives recitation clips over multipart HTTP and answers with a reading
//! label and confidence.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod classifier;
pub mod error;

pub use crate::classifier::{Classifier, MockClassifier};
pub use crate::error::{ApiError, ApiResult};

/// Largest accepted request body (25 MiB)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Classifier answering predict requests
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    Router::new()
        .route(qiraat_common::api::PREDICT_PATH, post(api::predict))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
