pub mod domain;
pub mod errors;
pub mod memory;
pub mod ports;
pub mod schemas;
pub mod services;

pub use domain::{
    NewSession, NewTask, NewUser, OwnedResource, RequestUser, Session, Task, TaskChanges, TaskFilter, User,
    ANONYMOUS_FEATURES, DEFAULT_USER_FEATURES,
};
pub use errors::{AppError, ErrorBody, ErrorKind, FieldIssue};
pub use ports::{PasswordHasher, PortError, PortResult, SessionRepository, TaskRepository, UserRepository};
pub use services::Services;
