//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! repository ports from the `core` crate. It handles all interactions with the
//! PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use taskboard_core::domain::{NewSession, NewTask, NewUser, Session, Task, TaskChanges, TaskFilter, User};
use taskboard_core::ports::{PortError, PortResult, SessionRepository, TaskRepository, UserRepository};
use uuid::Uuid;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every repository port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Translates driver errors into port errors, keeping the driver's text.
fn port_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(e.to_string()),
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => PortError::Conflict {
            constraint: db.constraint().unwrap_or_default().to_string(),
        },
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    features: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            features: self.features,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    token: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl SessionRecord {
    fn to_domain(self) -> Session {
        Session {
            id: self.id,
            token: self.token,
            user_id: self.user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: Uuid,
    name: String,
    description: Option<String>,
    user_id: Uuid,
    due_date: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl TaskRecord {
    fn to_domain(self) -> Task {
        Task {
            id: self.id,
            name: self.name,
            description: self.description,
            user_id: self.user_id,
            due_date: self.due_date,
            finished_at: self.finished_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, email, username, password_hash, features, created_at, updated_at";
const SESSION_COLUMNS: &str = "id, token, user_id, expires_at, created_at, updated_at";
const TASK_COLUMNS: &str = "id, name, description, user_id, due_date, finished_at, created_at, updated_at";

//=========================================================================================
// `UserRepository` Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for DbAdapter {
    async fn create(&self, user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, username, password_hash, features) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.features)
            .fetch_one(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.map(UserRecord::to_domain))
    }
}

//=========================================================================================
// `SessionRepository` Implementation
//=========================================================================================

#[async_trait]
impl SessionRepository for DbAdapter {
    async fn create(&self, session: NewSession) -> PortResult<Session> {
        let sql = format!(
            "INSERT INTO sessions (id, token, user_id, expires_at) VALUES ($1, $2, $3, $4) RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn find_by_token(&self, token: &str) -> PortResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token = $1");
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.map(SessionRecord::to_domain))
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.map(SessionRecord::to_domain))
    }

    async fn expire(&self, id: Uuid, at: DateTime<Utc>) -> PortResult<Session> {
        let sql = format!(
            "UPDATE sessions SET expires_at = LEAST(expires_at, $2), updated_at = $2 WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .bind(at)
            .fetch_one(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `TaskRepository` Implementation
//=========================================================================================

#[async_trait]
impl TaskRepository for DbAdapter {
    async fn create(&self, task: NewTask) -> PortResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, name, description, user_id, due_date, finished_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TASK_COLUMNS}"
        );
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&task.name)
            .bind(&task.description)
            .bind(task.user_id)
            .bind(task.due_date)
            .bind(task.finished_at)
            .fetch_one(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn find_many(&self, filter: &TaskFilter) -> PortResult<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at ASC"
        );
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(filter.user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(port_error)?;

        let tasks = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(tasks)
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.map(TaskRecord::to_domain))
    }

    /// Absent fields keep their value. Nullable columns carry an explicit flag
    /// so that "set to NULL" differs from "leave alone".
    async fn update(&self, id: Uuid, changes: TaskChanges) -> PortResult<Task> {
        let sql = format!(
            "UPDATE tasks SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                due_date = COALESCE($5, due_date), \
                finished_at = CASE WHEN $6 THEN $7 ELSE finished_at END, \
                updated_at = $8 \
             WHERE id = $1 RETURNING {TASK_COLUMNS}"
        );
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description.is_some())
            .bind(changes.description.flatten())
            .bind(changes.due_date)
            .bind(changes.finished_at.is_some())
            .bind(changes.finished_at.flatten())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn delete_by_id(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Task {} not found", id)));
        }
        Ok(())
    }
}
