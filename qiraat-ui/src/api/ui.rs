//! UI serving routes
//!
//! Serves the analyzer page rendered from the caller's session and the page
//! script that drives the browser waveform and recorder.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::api::cookie::{open_session, SessionCookie};
use crate::error::UiResult;
use crate::presenter::render_page;
use crate::AppState;

const APP_JS: &str = include_str!("../ui/app.js");

/// GET /
///
/// Serves the analyzer page, opening a session on first visit
pub async fn serve_index(State(state): State<AppState>, cookie: SessionCookie) -> UiResult<Response> {
    let (id, set_cookie) = open_session(&state, cookie).await;
    let view = state.sessions.with_session(id, |session| session.page_view()).await?;
    Ok((set_cookie, Html(render_page(&view, None))).into_response())
}

/// GET /static/app.js
///
/// Serves the JavaScript application
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/javascript")],
        APP_JS,
    )
        .into_response()
}
