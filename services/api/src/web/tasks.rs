//! services/api/src/web/tasks.rs
//!
//! Task routes. Item routes answer 403 both for tasks the caller may not touch
//! and for tasks that do not exist, so existence never leaks.

use axum::{http::StatusCode, response::IntoResponse};
use futures::FutureExt;
use taskboard_core::schemas::task::TaskResponse;
use taskboard_core::{AppError, ErrorKind, RequestUser, TaskFilter};
use tracing::instrument;

use crate::web::errors::on_error;
use crate::web::identity::{can_request, endpoint_with_user};
use crate::web::pipeline::{handler, Endpoint, EndpointRequest, Flow, RequestContext};
use crate::web::responses::json;
use crate::web::state::AppState;

/// `/api/v1/tasks`
pub fn collection() -> Endpoint {
    endpoint_with_user()
        .get([
            can_request("view:task"),
            handler(|state, req, ctx| list_tasks(state, req, ctx).boxed()),
        ])
        .post([
            can_request("create:task"),
            handler(|state, req, ctx| create_task(state, req, ctx).boxed()),
        ])
        .build(on_error)
}

/// `/api/v1/tasks/{id}`
pub fn item() -> Endpoint {
    endpoint_with_user()
        .get([
            can_request("view:task"),
            handler(|state, req, ctx| get_task(state, req, ctx).boxed()),
        ])
        .patch([
            can_request("update:task"),
            handler(|state, req, ctx| update_task(state, req, ctx).boxed()),
        ])
        .delete([
            can_request("delete:task"),
            handler(|state, req, ctx| delete_task(state, req, ctx).boxed()),
        ])
        .build(on_error)
}

/// Loads the task and checks the caller may apply `feature` to it.
async fn authorized_task(
    state: &AppState,
    user: &RequestUser,
    feature: &str,
    id: &str,
) -> Result<TaskResponse, AppError> {
    let task = state.services.tasks.find_by_id(id).await?;
    if !state.services.authorization.can_for(user, feature, &task) {
        return Err(AppError::forbidden());
    }
    Ok(task)
}

/// Turns "not found" and "not yours" into the same 403.
fn hide_existence(verb: &'static str) -> impl Fn(AppError) -> AppError {
    move |err| match err.kind() {
        ErrorKind::NotFound | ErrorKind::Forbidden => AppError::forbidden()
            .with_message(format!("Você não tem permissão para {verb} essa tarefa."))
            .with_action("Verifique se informou a tarefa correta.")
            .with_cause(err),
        _ => err,
    }
}

/// List tasks. Callers see their own unless they hold `view:task:others`.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "Visible tasks", body = [TaskResponse]),
        (status = 403, description = "Caller may not view tasks", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn list_tasks(state: &AppState, _req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
    let user = ctx.user();
    let filter = if state.services.authorization.can(&user, "view:task:others") {
        TaskFilter::default()
    } else {
        TaskFilter { user_id: user.id() }
    };
    let tasks = state.services.tasks.find_many(filter).await?;
    Ok(Flow::Respond(json(StatusCode::OK, &tasks)))
}

/// Create a task owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "tasks",
    request_body = crate::web::rest::CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid fields", body = taskboard_core::ErrorBody),
        (status = 403, description = "Caller may not create tasks", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn create_task(state: &AppState, req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
    let owner = ctx.user().id().ok_or_else(AppError::forbidden)?;
    let task = state.services.tasks.create(owner, req.json()?).await?;
    Ok(Flow::Respond(json(StatusCode::CREATED, &task)))
}

/// Fetch one task.
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 403, description = "Missing, or not visible to the caller", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all, fields(task_id = %ctx.param("id")))]
pub async fn get_task(state: &AppState, _req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
    let task = authorized_task(state, &ctx.user(), "view:task", ctx.param("id"))
        .await
        .map_err(hide_existence("visualizar"))?;
    Ok(Flow::Respond(json(StatusCode::OK, &task)))
}

/// Partially update one task. Absent fields are left alone.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    request_body = crate::web::rest::UpdateTaskRequest,
    responses(
        (status = 200, description = "The updated task", body = TaskResponse),
        (status = 400, description = "Invalid fields", body = taskboard_core::ErrorBody),
        (status = 403, description = "Missing, or not editable by the caller", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all, fields(task_id = %ctx.param("id")))]
pub async fn update_task(state: &AppState, req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
    let user = ctx.user();
    let task = async {
        let task = authorized_task(state, &user, "update:task", ctx.param("id")).await?;
        state.services.tasks.update(task.id, &req.json()?).await
    }
    .await
    .map_err(hide_existence("atualizar"))?;
    Ok(Flow::Respond(json(StatusCode::OK, &task)))
}

/// Delete one task.
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Missing, or not deletable by the caller", body = taskboard_core::ErrorBody)
    )
)]
#[instrument(skip_all, fields(task_id = %ctx.param("id")))]
pub async fn delete_task(state: &AppState, _req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
    let user = ctx.user();
    async {
        let task = authorized_task(state, &user, "delete:task", ctx.param("id")).await?;
        state.services.tasks.delete_by_id(task.id).await
    }
    .await
    .map_err(hide_existence("deletar"))?;
    Ok(Flow::Respond(StatusCode::NO_CONTENT.into_response()))
}
