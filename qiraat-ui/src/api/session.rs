//! Session teardown route

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::cookie::{expired_cookie_value, SessionCookie};
use crate::api::playback::CommandsResponse;
use crate::error::UiResult;
use crate::session::SessionError;
use crate::AppState;

/// POST /session/end
///
/// Releases the session's audio and destroys its renderer. The response
/// carries the renderer's final commands and expires the cookie.
pub async fn end_session(
    State(state): State<AppState>,
    SessionCookie(id): SessionCookie,
) -> UiResult<Response> {
    let id = id.ok_or(SessionError::UnknownSession)?;
    let commands = state
        .sessions
        .end(id)
        .await
        .ok_or(SessionError::UnknownSession)?;

    Ok((
        [(SET_COOKIE, expired_cookie_value())],
        Json(CommandsResponse { commands }),
    )
        .into_response())
}
