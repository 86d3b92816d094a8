//! crates/taskboard_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::schemas::user::UserResponse;

/// Features granted to every user at registration.
pub const DEFAULT_USER_FEATURES: [&str; 5] = [
    "create:session",
    "delete:session",
    "create:task",
    "view:task",
    "delete:task",
];

/// Features of a request that carries no valid session.
pub const ANONYMOUS_FEATURES: [&str; 2] = ["create:session", "create:user"];

/// A registered account. `password_hash` never leaves the core.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub features: Vec<String>,
}

/// A browser login session (the `access_token` cookie).
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Partial update of a task. The outer `Option` of a nullable column tells
/// whether the field was sent; the inner one is the new value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<DateTime<Utc>>,
    pub finished_at: Option<Option<DateTime<Utc>>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.finished_at.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub user_id: Option<Uuid>,
}

/// Something owned by a single user, so ownership checks can apply to it.
pub trait OwnedResource {
    fn owner_id(&self) -> Uuid;
}

impl OwnedResource for Task {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// The identity attached to one request.
#[derive(Debug, Clone)]
pub enum RequestUser {
    Authenticated(UserResponse),
    Anonymous { features: Vec<String> },
}

impl RequestUser {
    pub fn anonymous() -> Self {
        Self::Anonymous {
            features: ANONYMOUS_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Authenticated(user) => Some(user.id),
            Self::Anonymous { .. } => None,
        }
    }

    pub fn features(&self) -> &[String] {
        match self {
            Self::Authenticated(user) => &user.features,
            Self::Anonymous { features } => features,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous { .. })
    }
}
