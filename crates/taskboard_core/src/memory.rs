//! crates/taskboard_core/src/memory.rs
//!
//! An in-process implementation of every repository port. It enforces the same
//! uniqueness constraints as the relational schema and reports violations with
//! the same constraint names, so services behave identically on top of it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{NewSession, NewTask, NewUser, Session, Task, TaskChanges, TaskFilter, User};
use crate::ports::{PortError, PortResult, SessionRepository, TaskRepository, UserRepository};

pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const SESSIONS_TOKEN_KEY: &str = "sessions_token_key";

#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature to an existing user. There is no HTTP route for this;
    /// it stands in for an administrator editing the record.
    pub async fn grant_feature(&self, user_id: Uuid, feature: &str) -> PortResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("user {user_id}")))?;
        if !user.features.iter().any(|f| f == feature) {
            user.features.push(feature.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> PortResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(PortError::Conflict {
                constraint: USERS_EMAIL_KEY.to_string(),
            });
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(PortError::Conflict {
                constraint: USERS_USERNAME_KEY.to_string(),
            });
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            features: user.features,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> PortResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create(&self, session: NewSession) -> PortResult<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.values().any(|s| s.token == session.token) {
            return Err(PortError::Conflict {
                constraint: SESSIONS_TOKEN_KEY.to_string(),
            });
        }
        let now = Utc::now();
        let created = Session {
            id: Uuid::new_v4(),
            token: session.token,
            user_id: session.user_id,
            expires_at: session.expires_at,
            created_at: now,
            updated_at: now,
        };
        sessions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_token(&self, token: &str) -> PortResult<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn expire(&self, id: Uuid, at: DateTime<Utc>) -> PortResult<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("session {id}")))?;
        session.expires_at = session.expires_at.min(at);
        session.updated_at = at;
        Ok(session.clone())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, task: NewTask) -> PortResult<Task> {
        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4(),
            name: task.name,
            description: task.description,
            user_id: task.user_id,
            due_date: task.due_date,
            finished_at: task.finished_at,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_many(&self, filter: &TaskFilter) -> PortResult<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| filter.user_id.map_or(true, |owner| t.user_id == owner))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Task>> {
        Ok(self.tasks.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> PortResult<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| PortError::NotFound(format!("task {id}")))?;
        if let Some(name) = changes.name {
            task.name = name;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        if let Some(finished_at) = changes.finished_at {
            task.finished_at = finished_at;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> PortResult<()> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(PortError::NotFound(format!("task {id}")));
        }
        Ok(())
    }
}
