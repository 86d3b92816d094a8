//! services/api/src/web/sessions.rs
//!
//! `POST /api/v1/sessions` logs in; `DELETE /api/v1/sessions` logs out.

use axum::{http::StatusCode, response::IntoResponse};
use futures::FutureExt;
use taskboard_core::{AppError, ErrorKind};
use tracing::{info, instrument};

use crate::web::cookies::{expired_session_cookie, session_cookie};
use crate::web::errors::on_error;
use crate::web::identity::{can_request, endpoint_with_user};
use crate::web::pipeline::{handler, Endpoint, EndpointRequest, Flow, RequestContext};
use crate::web::responses::{json, with_cookie};
use crate::web::state::AppState;

pub fn endpoint() -> Endpoint {
    endpoint_with_user()
        .post([
            can_request("create:session"),
            handler(|state, req, ctx| create_session(state, req, ctx).boxed()),
        ])
        .delete([
            can_request("delete:session"),
            handler(|state, req, ctx| delete_session(state, req, ctx).boxed()),
        ])
        .build(on_error)
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    request_body = crate::web::rest::LoginRequest,
    responses(
        (status = 201, description = "Session created; `access_token` cookie set", body = taskboard_core::schemas::session::SessionResponse),
        (status = 400, description = "Malformed body", body = taskboard_core::ErrorBody),
        (status = 401, description = "Wrong email or password", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn create_session(
    state: &AppState,
    req: &EndpointRequest,
    _ctx: &mut RequestContext,
) -> Result<Flow, AppError> {
    let payload = req.json()?;
    let user = state
        .services
        .authentication
        .authenticated_user(&payload)
        .await
        .map_err(|err| match err.kind() {
            ErrorKind::Unauthorized => AppError::unauthorized()
                .with_message("E-mail ou senha incorretos.")
                .with_action("Verifique se as credenciais foram digitadas corretamente.")
                .with_cause(err),
            _ => err,
        })?;

    let session = state.services.sessions.create(user.id).await?;
    let max_age = state.services.sessions.expiration_duration().num_seconds();
    let cookie = session_cookie(&session.token, max_age, state.secure_cookies());

    info!(user_id = %user.id, "User logged in");
    let response = with_cookie(json(StatusCode::CREATED, &session), &cookie)?;
    Ok(Flow::Respond(response))
}

/// Log out; the current session expires immediately.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 204, description = "Session expired; cookie cleared"),
        (status = 403, description = "No valid session", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn delete_session(
    state: &AppState,
    _req: &EndpointRequest,
    ctx: &mut RequestContext,
) -> Result<Flow, AppError> {
    let session = ctx
        .session
        .as_ref()
        .ok_or_else(|| AppError::forbidden().with_cause(AppError::unauthorized()))?;
    state.services.sessions.expire_by_id(session.id).await?;

    info!(session_id = %session.id, "User logged out");
    let response = with_cookie(
        StatusCode::NO_CONTENT.into_response(),
        &expired_session_cookie(state.secure_cookies()),
    )?;
    Ok(Flow::Respond(response))
}
