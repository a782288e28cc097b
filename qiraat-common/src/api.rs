//! Wire types for the classification endpoint
//!
//! Used by qiraat-id (producer) and qiraat-ui (consumer). The request is a
//! multipart body with a single part named [`PREDICT_FILE_FIELD`]; the
//! success response is a [`crate::Prediction`] serialized as JSON.

use serde::{Deserialize, Serialize};

/// Logical route of the classification endpoint
pub const PREDICT_PATH: &str = "/predict";

/// Multipart field carrying the audio bytes
pub const PREDICT_FILE_FIELD: &str = "file";

/// 400 body message when the request carries no audio part
pub const MISSING_FILE_MESSAGE: &str = "File audio tidak ditemukan.";

/// 500 body message for any failure while handling the request
pub const PROCESSING_FAILED_MESSAGE: &str = "Gagal memproses permintaan.";

/// Error body returned with every non-2xx response
///
/// # Examples
///
/// ```
/// use qiraat_common::api::ErrorBody;
///
/// let body: ErrorBody = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
/// assert_eq!(body.error, "boom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Health check response shared by both services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok(module: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            module: module.to_string(),
            version: version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_serializes_flat() {
        let json = serde_json::to_string(&ErrorBody::new(MISSING_FILE_MESSAGE)).unwrap();
        assert_eq!(json, r#"{"error":"File audio tidak ditemukan."}"#);
    }

    #[test]
    fn test_error_body_rejects_non_string_error() {
        let parsed = serde_json::from_str::<ErrorBody>(r#"{"error":42}"#);
        assert!(parsed.is_err());
    }
}
