//! Shared fixtures for the unit tests of this crate.

use std::sync::Arc;

use argon2::Params;

use crate::adapters::Argon2Hasher;
use crate::config::{AppEnv, Config};
use crate::web::state::AppState;

pub fn test_config() -> Config {
    Config {
        bind_address: ([127, 0, 0, 1], 0).into(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        log_level: tracing::Level::DEBUG,
        app_env: AppEnv::Test,
        password_pepper: "pimenta".to_string(),
        cors_origin: None,
    }
}

pub fn test_state() -> AppState {
    let params = Params::new(8, 1, 1, None).expect("valid argon2 params");
    let hasher = Argon2Hasher::with_params("pimenta", params).expect("hasher builds");
    AppState::in_memory(Arc::new(test_config()), Arc::new(hasher)).0
}
