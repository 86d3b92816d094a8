use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    as_object, bound, max_chars, nullable_date, nullable_string, required_date, required_string,
    serialize_iso, serialize_iso_opt, uuid, Bound, Issues, RuleResult,
};
use crate::domain::{NewTask, OwnedResource, Task, TaskChanges};
use crate::errors::AppError;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 8_000;

const NAME_REQUIRED: Bound = bound(
    "Nome da tarefa é obrigatório.",
    "Confira se o nome da tarefa foi inserido.",
);
const NAME_TOO_LONG: Bound = bound(
    "O nome deve ter no máximo 100 caracteres.",
    "Reescreva o nome da tarefa de maneira mais resumida.",
);
const DESCRIPTION_TOO_LONG: Bound = bound(
    "O descrição deve ter no máximo 8000 caracteres.",
    "Reescreva a descrição da tarefa de maneira mais resumida.",
);
const USER_REQUIRED: Bound = bound("O campo usuário é obrigatório.", "Confira se o usuário foi inserido.");
const DUE_DATE_REQUIRED: Bound = bound("O prazo da tarefa é obrigatório.", "Confira se o prazo foi inserido.");
const DUE_DATE_INVALID: Bound = bound("Insira um prazo válido.", "Confira se o prazo foi inserido corretamente.");
const FINISHED_AT_INVALID: Bound = bound(
    "Insira uma data de finalização válida.",
    "Confira se a data inserida está correta.",
);

//=========================================================================================
// Input Schemas
//=========================================================================================

/// A validated creation payload. Route handlers build it with
/// `from_json_for_owner`, so `user_id` is always the requester's id.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub due_date: DateTime<Utc>,
}

impl CreateTask {
    pub fn from_json(payload: &Value) -> Result<Self, AppError> {
        let mut issues = Issues::new();
        let empty = Map::new();
        let body = as_object(payload, &mut issues, &empty);
        Self::validate(issues, body)
    }

    /// Validates `payload` with `userId` set to `owner`, whatever the payload
    /// itself carries. An empty or non-object payload still gets the owner, so
    /// only client-supplied fields are ever reported.
    pub fn from_json_for_owner(payload: &Value, owner: Uuid) -> Result<Self, AppError> {
        let mut issues = Issues::new();
        let empty = Map::new();
        let mut body = as_object(payload, &mut issues, &empty).clone();
        body.insert("userId".to_string(), Value::String(owner.to_string()));
        Self::validate(issues, &body)
    }

    fn validate(mut issues: Issues, body: &Map<String, Value>) -> Result<Self, AppError> {
        let name = issues.check("name", name(body.get("name")));
        let description = issues.check("description", description(body.get("description")));
        let user_id = issues.check("userId", uuid(body.get("userId"), USER_REQUIRED));
        let due_date = issues.check("dueDate", required_date(body.get("dueDate"), DUE_DATE_REQUIRED));

        match (name, description, user_id, due_date) {
            (Some(name), Some(description), Some(user_id), Some(due_date)) if issues.is_empty() => {
                Ok(Self {
                    name,
                    description: description.flatten(),
                    user_id,
                    due_date,
                })
            }
            _ => Err(issues.into_error()),
        }
    }

    pub fn into_new_task(self) -> NewTask {
        NewTask {
            name: self.name,
            description: self.description,
            user_id: self.user_id,
            due_date: self.due_date,
            finished_at: None,
        }
    }
}

/// A validated partial update. Ownership is not part of it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub changes: TaskChanges,
}

impl UpdateTask {
    pub fn from_json(payload: &Value) -> Result<Self, AppError> {
        let mut issues = Issues::new();
        let empty = Map::new();
        let body = as_object(payload, &mut issues, &empty);

        let name = match body.get("name") {
            None => Some(None),
            Some(value) => issues.check("name", name(Some(value))).map(Some),
        };
        let description = issues.check("description", description(body.get("description")));
        let due_date = match body.get("dueDate") {
            None => Some(None),
            Some(value) => issues
                .check("dueDate", required_date(Some(value), DUE_DATE_INVALID))
                .map(Some),
        };
        let finished_at = issues.check("finishedAt", nullable_date(body.get("finishedAt"), FINISHED_AT_INVALID));

        match (name, description, due_date, finished_at) {
            (Some(name), Some(description), Some(due_date), Some(finished_at)) if issues.is_empty() => {
                Ok(Self {
                    changes: TaskChanges {
                        name,
                        description,
                        due_date,
                        finished_at,
                    },
                })
            }
            _ => Err(issues.into_error()),
        }
    }
}

fn name(value: Option<&Value>) -> RuleResult<String> {
    let name = required_string(value, NAME_REQUIRED)?;
    max_chars(name, NAME_MAX_CHARS, NAME_TOO_LONG)
}

fn description(value: Option<&Value>) -> RuleResult<Option<Option<String>>> {
    match nullable_string(value)? {
        Some(Some(text)) => max_chars(text, DESCRIPTION_MAX_CHARS, DESCRIPTION_TOO_LONG).map(|t| Some(Some(t))),
        other => Ok(other),
    }
}

//=========================================================================================
// Response Schema
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_iso")]
    pub due_date: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso_opt")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_iso")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso")]
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            name: task.name,
            user_id: task.user_id,
            description: task.description,
            due_date: task.due_date,
            finished_at: task.finished_at,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl OwnedResource for TaskResponse {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
