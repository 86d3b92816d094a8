//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the request
//! shapes it documents. Requests are validated by the core schemas; these
//! types only describe them.

use serde::Deserialize;
use taskboard_core::schemas::session::SessionResponse;
use taskboard_core::schemas::task::TaskResponse;
use taskboard_core::schemas::user::UserResponse;
use taskboard_core::{ErrorBody, FieldIssue};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::status::status,
        crate::web::sessions::create_session,
        crate::web::sessions::delete_session,
        crate::web::users::create_user,
        crate::web::tasks::list_tasks,
        crate::web::tasks::create_task,
        crate::web::tasks::get_task,
        crate::web::tasks::update_task,
        crate::web::tasks::delete_task,
    ),
    components(
        schemas(
            LoginRequest,
            CreateUserRequest,
            CreateTaskRequest,
            UpdateTaskRequest,
            SessionResponse,
            UserResponse,
            TaskResponse,
            ErrorBody,
            FieldIssue,
        )
    ),
    tags(
        (name = "sessions", description = "Login and logout through the `access_token` cookie."),
        (name = "users", description = "Account registration."),
        (name = "tasks", description = "Tasks owned by the authenticated user."),
        (name = "status", description = "Service health.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Documented Request Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    /// At least 3 of `[a-zA-Z0-9_.]`.
    pub username: String,
    /// At least 10 characters, with letters and digits.
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Up to 100 characters.
    pub name: String,
    /// Up to 8000 characters.
    pub description: Option<String>,
    /// An ISO-8601 timestamp, a `YYYY-MM-DD` date or epoch milliseconds.
    pub due_date: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    /// `null` clears it.
    pub description: Option<String>,
    pub due_date: Option<String>,
    /// `null` marks the task as not finished.
    pub finished_at: Option<String>,
}
