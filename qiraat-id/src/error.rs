//! Error types for qiraat-id
//!
//! Every error response carries the flat body `{"error": "<message>"}` so
//! clients can surface the message as-is.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qiraat_common::api::{ErrorBody, MISSING_FILE_MESSAGE, PROCESSING_FAILED_MESSAGE};
use thiserror::Error;
use tracing::error;

use crate::classifier::ClassifierError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No audio part in the request (400)
    #[error("Request has no audio file part")]
    MissingFile,

    /// Malformed request body or internal failure (500)
    #[error("Request processing failed: {0}")]
    Processing(String),

    /// Classifier could not produce a prediction (500)
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, MISSING_FILE_MESSAGE),
            ApiError::Processing(ref detail) => {
                error!("Predict request failed: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE)
            }
            ApiError::Classifier(ref err) => {
                error!("Classifier failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE)
            }
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
