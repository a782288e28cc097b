//! Session cookie
//!
//! The browser session is identified by the `qiraat_session` cookie holding
//! the session's UUID.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderName,
    },
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::AppState;

pub const SESSION_COOKIE: &str = "qiraat_session";

/// Session id sent by the browser, if any
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie(pub Option<Uuid>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionCookie(parse_session_cookie(&parts.headers)))
    }
}

/// Find a well-formed session id among the request's cookies
pub fn parse_session_cookie(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == SESSION_COOKIE)
        .find_map(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie_value(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn expired_cookie_value() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// `Set-Cookie` header part, present only when the session is new
pub type SetSessionCookie = Option<[(HeaderName, String); 1]>;

/// Resolve the request's session, opening one when the cookie is absent or stale
pub async fn open_session(state: &AppState, cookie: SessionCookie) -> (Uuid, SetSessionCookie) {
    let id = state.sessions.ensure(cookie.0).await;
    let set_cookie = (cookie.0 != Some(id)).then(|| [(SET_COOKIE, session_cookie_value(id))]);
    (id, set_cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; qiraat_session={}; lang=id", id)).unwrap(),
        );
        assert_eq!(parse_session_cookie(&headers), Some(id));
    }

    #[test]
    fn test_malformed_or_missing_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_session_cookie(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("qiraat_session=not-a-uuid"));
        assert_eq!(parse_session_cookie(&headers), None);
    }

    #[test]
    fn test_cookie_values() {
        let id = Uuid::nil();
        assert_eq!(
            session_cookie_value(id),
            "qiraat_session=00000000-0000-0000-0000-000000000000; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expired_cookie_value().contains("Max-Age=0"));
    }
}
