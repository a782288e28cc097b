//! Audio upload and playable URL routes

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
};
use qiraat_common::api::PREDICT_FILE_FIELD;
use tracing::debug;
use uuid::Uuid;

use crate::api::cookie::{open_session, SessionCookie};
use crate::capture::RawAudio;
use crate::error::{UiError, UiResult};
use crate::AppState;

/// Multipart field marking the clip as a microphone recording
pub const RECORDED_FIELD: &str = "recorded";

/// POST /audio
///
/// Replaces the session's audio with the `file` part, then returns to the
/// page. A request whose `file` part has neither a name nor bytes leaves
/// the session as is.
pub async fn upload_audio(
    State(state): State<AppState>,
    cookie: SessionCookie,
    multipart: Result<Multipart, MultipartRejection>,
) -> UiResult<Response> {
    let mut multipart = multipart.map_err(|e| UiError::Multipart(e.to_string()))?;
    let raw = read_upload(&mut multipart).await?;

    let (id, set_cookie) = open_session(&state, cookie).await;
    if raw.is_none() {
        debug!(session = %id, "Upload without audio ignored");
    }
    state.sessions.submit_audio(id, raw).await?;

    Ok((set_cookie, Redirect::to("/")).into_response())
}

async fn read_upload(multipart: &mut Multipart) -> UiResult<Option<RawAudio>> {
    let mut audio = None;
    let mut recorded = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UiError::Multipart(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PREDICT_FILE_FIELD) => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UiError::Multipart(e.to_string()))?;
                // An empty file input posts an unnamed zero-length part
                let named = file_name.as_deref().is_some_and(|n| !n.is_empty());
                if named || !bytes.is_empty() {
                    audio = Some(RawAudio::new(file_name, content_type, bytes));
                }
            }
            Some(RECORDED_FIELD) => recorded = true,
            _ => debug!("Skipping multipart field {:?}", name),
        }
    }

    // Recordings carry whatever name the browser invents for blobs
    Ok(audio.map(|mut raw| {
        if recorded {
            raw.file_name = None;
        }
        raw
    }))
}

/// GET /blob/:id
///
/// Serves the bytes behind a live playable URL
pub async fn serve_blob(State(state): State<AppState>, Path(id): Path<Uuid>) -> UiResult<Response> {
    let blob = state
        .sessions
        .blobs()
        .get(&id)
        .ok_or_else(|| UiError::NotFound(format!("audio {}", id)))?;

    Ok((
        [
            (CONTENT_TYPE, blob.content_type),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        blob.bytes,
    )
        .into_response())
}
