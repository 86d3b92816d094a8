//! services/api/src/error.rs
//!
//! Startup failures of the `api` binary. Request-level failures are
//! `taskboard_core::AppError` values and never reach this type.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting the pool failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Binding or serving the listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Building a component failed, e.g. the password hasher.
    #[error("Startup failed: {0}")]
    Internal(String),
}
