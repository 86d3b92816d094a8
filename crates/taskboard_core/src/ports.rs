//! crates/taskboard_core/src/ports.rs
//!
//! Contracts between the domain services and the outside world: one repository
//! per entity plus the password hasher. Postgres and the in-memory store both
//! implement every repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewSession, NewTask, NewUser, Session, Task, TaskChanges, TaskFilter, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Failure of any port call, independent of the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict on {constraint}")]
    Conflict { constraint: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> PortResult<User>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> PortResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> PortResult<Option<User>>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: NewSession) -> PortResult<Session>;

    async fn find_by_token(&self, token: &str) -> PortResult<Option<Session>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Session>>;

    /// Moves `expires_at` to `at` unless it is already earlier, and stamps `updated_at`.
    async fn expire(&self, id: Uuid, at: DateTime<Utc>) -> PortResult<Session>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> PortResult<Task>;

    async fn find_many(&self, filter: &TaskFilter) -> PortResult<Vec<Task>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Task>>;

    async fn update(&self, id: Uuid, changes: TaskChanges) -> PortResult<Task>;

    async fn delete_by_id(&self, id: Uuid) -> PortResult<()>;
}

//=========================================================================================
// Password Hashing Port
//=========================================================================================

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a self-describing string.
    async fn hash(&self, plain: &str) -> PortResult<String>;

    /// Checks a plaintext password against a stored hash.
    async fn compare(&self, plain: &str, hashed: &str) -> PortResult<bool>;

    /// A valid hash that matches no real password. Comparing against it costs
    /// the same as comparing against a stored one.
    fn placeholder_hash(&self) -> &str;
}
