//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::{AppEnv, Config};
use std::sync::Arc;
use taskboard_core::memory::InMemoryStore;
use taskboard_core::ports::PasswordHasher;
use taskboard_core::Services;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(services: Services, config: Arc<Config>) -> Self {
        Self { services, config }
    }

    /// Wires every service to one in-memory store. The store is handed back so
    /// callers can inspect or seed it.
    pub fn in_memory(config: Arc<Config>, hasher: Arc<dyn PasswordHasher>) -> (Self, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let services = Services::new(store.clone(), store.clone(), store.clone(), hasher);
        (Self::new(services, config), store)
    }

    pub fn app_env(&self) -> AppEnv {
        self.config.app_env
    }

    /// Cookies get the `Secure` attribute in production only.
    pub fn secure_cookies(&self) -> bool {
        self.config.app_env.is_production()
    }
}
