//! Identification route

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::api::cookie::{open_session, SessionCookie};
use crate::error::UiResult;
use crate::presenter::render_page;
use crate::session::{SessionError, NO_AUDIO_PROMPT};
use crate::AppState;

/// POST /identify
///
/// Sends the session's audio to the classification endpoint and returns to
/// the page, which shows the outcome. Without audio the page is rendered
/// with the upload prompt (400) and nothing is sent. A second request while
/// one is in flight is refused with 409.
pub async fn identify(State(state): State<AppState>, cookie: SessionCookie) -> UiResult<Response> {
    let (id, set_cookie) = open_session(&state, cookie).await;

    match state.sessions.identify(id, &state.client).await {
        Ok(_) => Ok((set_cookie, Redirect::to("/")).into_response()),
        Err(SessionError::NoAudio) => {
            let view = state.sessions.with_session(id, |session| session.page_view()).await?;
            Ok((
                StatusCode::BAD_REQUEST,
                set_cookie,
                Html(render_page(&view, Some(NO_AUDIO_PROMPT))),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}
