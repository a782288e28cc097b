//! Waveform playback routes
//!
//! The page script owns the browser renderer. It asks the server to toggle
//! playback and executes the returned renderer commands, and it reports the
//! renderer's own play, pause and finish events back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::cookie::SessionCookie;
use crate::error::{UiError, UiResult};
use crate::session::{PlaybackSignal, SessionError};
use crate::waveform::RendererCommand;
use crate::AppState;

/// Renderer commands for the page to execute in order
#[derive(Debug, Serialize)]
pub struct CommandsResponse {
    pub commands: Vec<RendererCommand>,
}

/// POST /playback/toggle
pub async fn toggle_playback(
    State(state): State<AppState>,
    SessionCookie(id): SessionCookie,
) -> UiResult<Json<CommandsResponse>> {
    let id = id.ok_or(SessionError::UnknownSession)?;
    let commands = state
        .sessions
        .with_session(id, |session| {
            session.toggle_playback()?;
            Ok::<_, SessionError>(session.take_renderer_commands())
        })
        .await??;

    Ok(Json(CommandsResponse { commands }))
}

/// POST /playback/event/:signal
pub async fn playback_event(
    State(state): State<AppState>,
    SessionCookie(id): SessionCookie,
    Path(signal): Path<String>,
) -> UiResult<StatusCode> {
    let signal: PlaybackSignal = signal.parse().map_err(UiError::BadRequest)?;
    let id = id.ok_or(SessionError::UnknownSession)?;
    state
        .sessions
        .with_session(id, |session| session.on_playback(signal))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
