//! services/api/src/web/cookies.rs
//!
//! Building and reading the `access_token` session cookie.

use axum::http::{header, HeaderMap};
use cookie::{time::Duration, Cookie};

pub const ACCESS_TOKEN: &str = "access_token";

/// Value written over the token when the client must drop its cookie.
const INVALID_TOKEN: &str = "invalid";

/// The cookie issued on login.
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    Cookie::build((ACCESS_TOKEN, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(Duration::seconds(max_age_seconds))
        .build()
        .to_string()
}

/// The cookie that tells the client to discard its session.
pub fn expired_session_cookie(secure: bool) -> String {
    Cookie::build((ACCESS_TOKEN, INVALID_TOKEN))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(Duration::seconds(-1))
        .build()
        .to_string()
}

/// Reads a cookie from every `Cookie` header of a request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| Cookie::parse(pair.trim().to_string()).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
