//! services/api/src/web/errors.rs
//!
//! The error handler shared by every endpoint: it decides what a failure looks
//! like to the client and logs what the client must not see.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use taskboard_core::{AppError, ErrorKind};
use tracing::{error, warn};

use crate::config::AppEnv;
use crate::web::cookies::expired_session_cookie;
use crate::web::state::AppState;

pub fn on_error(state: &AppState, error: AppError) -> Response {
    let clear_session = error.cause_kind() == Some(ErrorKind::Unauthorized);
    let exposed = expose(error, state.app_env());

    let status = StatusCode::from_u16(exposed.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Json(exposed.body())).into_response();

    if clear_session {
        match HeaderValue::from_str(&expired_session_cookie(state.secure_cookies())) {
            Ok(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Err(e) => warn!("Failed to build the session clearing cookie: {}", e),
        }
    }
    response
}

/// Expected failures pass through untouched. Everything else becomes an
/// `InternalServerError`, except configuration defects outside production.
fn expose(error: AppError, env: AppEnv) -> AppError {
    match error.kind() {
        ErrorKind::Validation | ErrorKind::Unauthorized | ErrorKind::Forbidden => error,
        ErrorKind::NotImplemented if !env.is_production() => {
            error!(error = %error.cause_chain(), "Endpoint misconfigured");
            error
        }
        _ => {
            let internal = AppError::internal(error);
            error!(error = %internal.cause_chain(), "Unexpected failure");
            internal
        }
    }
}
