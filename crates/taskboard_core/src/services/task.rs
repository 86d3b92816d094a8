use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::TaskFilter;
use crate::errors::AppError;
use crate::ports::TaskRepository;
use crate::schemas::task::{CreateTask, TaskResponse, UpdateTask};

fn task_not_found() -> AppError {
    AppError::not_found()
        .with_message("Tarefa não encontrada")
        .with_action("Verifique se o id informado está correto.")
}

pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    /// Creates a task owned by `owner`. Any `userId` in the payload is replaced.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, owner: Uuid, payload: Value) -> Result<TaskResponse, AppError> {
        let input = CreateTask::from_json_for_owner(&payload, owner)?;
        let created = self.tasks.create(input.into_new_task()).await?;
        info!(task_id = %created.id, "Task created");
        Ok(created.into())
    }

    pub async fn find_many(&self, filter: TaskFilter) -> Result<Vec<TaskResponse>, AppError> {
        let tasks = self.tasks.find_many(&filter).await?;
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    /// Looks a task up by its raw path id. Ids that are not UUIDs are reported
    /// as not found without a store round trip.
    pub async fn find_by_id(&self, id: &str) -> Result<TaskResponse, AppError> {
        let id = Uuid::parse_str(id).map_err(|_| task_not_found())?;
        self.tasks
            .find_by_id(id)
            .await?
            .map(TaskResponse::from)
            .ok_or_else(task_not_found)
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: Uuid, payload: &Value) -> Result<TaskResponse, AppError> {
        let input = UpdateTask::from_json(payload)?;
        let updated = self.tasks.update(id, input.changes).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: Uuid) -> Result<(), AppError> {
        self.tasks.delete_by_id(id).await?;
        info!("Task deleted");
        Ok(())
    }
}
