//! services/api/src/web/status.rs

use axum::http::StatusCode;
use futures::FutureExt;
use serde_json::json;
use taskboard_core::AppError;

use crate::web::errors::on_error;
use crate::web::pipeline::{handler, Endpoint, EndpointBuilder, EndpointRequest, Flow, RequestContext};
use crate::web::responses;
use crate::web::state::AppState;

pub fn endpoint() -> Endpoint {
    EndpointBuilder::new()
        .get([handler(|state, req, ctx| status(state, req, ctx).boxed())])
        .build(on_error)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "status",
    responses((status = 200, description = "The service is up"))
)]
pub async fn status(_state: &AppState, _req: &EndpointRequest, _ctx: &mut RequestContext) -> Result<Flow, AppError> {
    Ok(Flow::Respond(responses::json(StatusCode::OK, &json!({ "status": "ok" }))))
}
