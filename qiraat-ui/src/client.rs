//! Classification endpoint client
//!
//! Sends one clip as a multipart `file` part to the predict URL and turns the
//! reply into an [`OutcomeRecord`]:
//! - 2xx with `{label, confidence}` → success
//! - non-2xx → failure carrying the body's `error` string, or `HTTP <status>`
//! - no usable response (connect error, timeout, unreadable 2xx body) →
//!   failure carrying [`GENERIC_ERROR_MESSAGE`], named after the user's
//!   file name or `audio`

use qiraat_common::api::PREDICT_FILE_FIELD;
use qiraat_common::{OutcomeRecord, Prediction};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::capture::AudioPayload;

const USER_AGENT: &str = concat!("qiraat-ui/", env!("CARGO_PKG_VERSION"));

/// Message shown when no response could be obtained
pub const GENERIC_ERROR_MESSAGE: &str = "Terjadi kesalahan saat mengidentifikasi audio.";

/// Classification client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint answered with a non-success status
    #[error("Endpoint error {status}: {message}")]
    Endpoint { status: u16, message: String },

    /// No usable response was obtained
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Message to show the user and keep in history
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Endpoint { message, .. } => message,
            ClientError::Transport(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// HTTP client for the classification endpoint
#[derive(Debug, Clone)]
pub struct ClassificationClient {
    http_client: reqwest::Client,
    predict_url: String,
}

impl ClassificationClient {
    pub fn new(predict_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            predict_url: predict_url.into(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Run one identification attempt; never fails, the error is the outcome
    ///
    /// Answered attempts are recorded under the upload name. Attempts that
    /// got no response are recorded under the user's name, or `audio`.
    pub async fn identify(&self, audio: &AudioPayload) -> OutcomeRecord {
        let name = audio.upload_file_name();
        match self.classify(audio).await {
            Ok(prediction) => {
                info!(
                    name = %name,
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    "Identification succeeded"
                );
                OutcomeRecord::success(name, prediction)
            }
            Err(e) => {
                let name = match &e {
                    ClientError::Endpoint { .. } => {
                        warn!(name = %name, "Identification rejected: {}", e);
                        name
                    }
                    ClientError::Transport(_) => {
                        error!(name = %name, "Identification failed: {}", e);
                        audio.display_name()
                    }
                };
                OutcomeRecord::failure(name, e.user_message())
            }
        }
    }

    /// Submit the clip and interpret the reply
    pub async fn classify(&self, audio: &AudioPayload) -> Result<Prediction, ClientError> {
        let part = Part::bytes(audio.bytes.to_vec())
            .file_name(audio.upload_file_name())
            .mime_str(audio.upload_content_type())
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = Form::new().part(PREDICT_FILE_FIELD, part);

        debug!(
            url = %self.predict_url,
            bytes = audio.bytes.len(),
            "Submitting audio for classification"
        );

        let response = self
            .http_client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        interpret_response(status.as_u16(), status.is_success(), &body)
    }
}

/// Map status and raw body to a prediction or error
///
/// A body that is not JSON is treated as absent.
pub fn interpret_response(status: u16, success: bool, body: &[u8]) -> Result<Prediction, ClientError> {
    let payload: Option<Value> = serde_json::from_slice(body).ok();

    if !success {
        let message = payload
            .as_ref()
            .and_then(|p| p.get("error"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(ClientError::Endpoint { status, message });
    }

    let payload = payload
        .ok_or_else(|| ClientError::Transport(format!("HTTP {} body is not JSON", status)))?;
    serde_json::from_value(payload)
        .map_err(|e| ClientError::Transport(format!("HTTP {} body is not a prediction: {}", status, e)))
}
