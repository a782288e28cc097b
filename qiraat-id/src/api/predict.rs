//! Classification endpoint
//!
//! `POST /predict` takes a multipart body whose `file` part holds the audio
//! clip and answers with `{label, confidence}`.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use qiraat_common::{api::PREDICT_FILE_FIELD, Prediction};
use tracing::{debug, info};

use crate::classifier::AudioUpload;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /predict
///
/// - 200 with a [`Prediction`] when a `file` part is present
/// - 400 when no `file` part is present
/// - 500 when the body cannot be read as multipart or classification fails
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Prediction>> {
    let mut multipart = multipart.map_err(|e| ApiError::Processing(e.to_string()))?;

    let upload = read_audio_part(&mut multipart)
        .await?
        .ok_or(ApiError::MissingFile)?;

    info!(
        file_name = upload.file_name.as_deref().unwrap_or(""),
        content_type = upload.content_type.as_deref().unwrap_or(""),
        bytes = upload.bytes.len(),
        classifier = state.classifier.name(),
        "Classifying audio"
    );

    let prediction = state.classifier.classify(&upload)?;

    info!(
        label = %prediction.label,
        confidence = prediction.confidence,
        "Prediction complete"
    );

    Ok(Json(prediction))
}

/// Find the first `file` part that carries a file (not a plain text value)
async fn read_audio_part(multipart: &mut Multipart) -> ApiResult<Option<AudioUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Processing(e.to_string()))?
    {
        if field.name() != Some(PREDICT_FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        if file_name.is_none() && content_type.is_none() {
            debug!("Skipping non-file `file` field");
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Processing(e.to_string()))?;

        return Ok(Some(AudioUpload {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}
