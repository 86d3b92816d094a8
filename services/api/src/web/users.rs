//! services/api/src/web/users.rs

use axum::http::StatusCode;
use futures::FutureExt;
use taskboard_core::AppError;
use tracing::instrument;

use crate::web::errors::on_error;
use crate::web::identity::{can_request, endpoint_with_user};
use crate::web::pipeline::{handler, Endpoint, EndpointRequest, Flow, RequestContext};
use crate::web::responses::json;
use crate::web::state::AppState;

pub fn endpoint() -> Endpoint {
    endpoint_with_user()
        .post([
            can_request("create:user"),
            handler(|state, req, ctx| create_user(state, req, ctx).boxed()),
        ])
        .build(on_error)
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = crate::web::rest::CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = taskboard_core::schemas::user::UserResponse),
        (status = 400, description = "Invalid fields, or email/username already taken", body = taskboard_core::ErrorBody),
        (status = 403, description = "Caller may not register users", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn create_user(state: &AppState, req: &EndpointRequest, _ctx: &mut RequestContext) -> Result<Flow, AppError> {
    let payload = req.json()?;
    let user = state.services.users.create(&payload).await?;
    Ok(Flow::Respond(json(StatusCode::CREATED, &user)))
}
