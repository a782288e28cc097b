//! Error types for qiraat-ui

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qiraat_common::api::ErrorBody;
use thiserror::Error;
use tracing::warn;

use crate::session::SessionError;

/// UI API error type
#[derive(Debug, Error)]
pub enum UiError {
    /// Session refused the action
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Upload body could not be read (400)
    #[error("Upload could not be read: {0}")]
    Multipart(String),
}

impl UiError {
    pub fn status(&self) -> StatusCode {
        match self {
            UiError::Session(SessionError::NoAudio) => StatusCode::BAD_REQUEST,
            UiError::Session(SessionError::Busy) => StatusCode::CONFLICT,
            UiError::Session(SessionError::UnknownSession) => StatusCode::NOT_FOUND,
            UiError::BadRequest(_) | UiError::Multipart(_) => StatusCode::BAD_REQUEST,
            UiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Request refused ({}): {}", status.as_u16(), self);
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// Result type for UI handlers
pub type UiResult<T> = Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NO_AUDIO_PROMPT;

    #[test]
    fn test_session_errors_map_to_status() {
        assert_eq!(UiError::from(SessionError::NoAudio).status(), StatusCode::BAD_REQUEST);
        assert_eq!(UiError::from(SessionError::Busy).status(), StatusCode::CONFLICT);
        assert_eq!(
            UiError::from(SessionError::UnknownSession).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_no_audio_message_is_prompt() {
        assert_eq!(UiError::from(SessionError::NoAudio).to_string(), NO_AUDIO_PROMPT);
    }
}
