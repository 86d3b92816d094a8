//! crates/taskboard_core/src/services/mod.rs
//!
//! Domain services. Each one is built once at startup from the ports it needs
//! and shared by every request.

pub mod authentication;
pub mod authorization;
pub mod session;
pub mod task;
pub mod user;

use std::sync::Arc;

pub use authentication::AuthenticationService;
pub use authorization::AuthorizationService;
pub use session::SessionService;
pub use task::TaskService;
pub use user::UserService;

use crate::ports::{PasswordHasher, SessionRepository, TaskRepository, UserRepository};

/// Every domain service, wired to one set of ports.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub sessions: Arc<SessionService>,
    pub tasks: Arc<TaskService>,
    pub authentication: Arc<AuthenticationService>,
    pub authorization: AuthorizationService,
}

impl Services {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        tasks: Arc<dyn TaskRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(users.clone(), hasher.clone())),
            sessions: Arc::new(SessionService::new(sessions)),
            tasks: Arc::new(TaskService::new(tasks)),
            authentication: Arc::new(AuthenticationService::new(users, hasher)),
            authorization: AuthorizationService::new(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::ports::{PasswordHasher, PortResult};

    /// Reversible stand-in for a real hasher that counts comparisons.
    #[derive(Debug, Default)]
    pub struct CountingHasher {
        comparisons: AtomicUsize,
    }

    impl CountingHasher {
        pub fn comparisons(&self) -> usize {
            self.comparisons.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PasswordHasher for CountingHasher {
        async fn hash(&self, plain: &str) -> PortResult<String> {
            Ok(format!("hashed:{plain}"))
        }

        async fn compare(&self, plain: &str, hashed: &str) -> PortResult<bool> {
            self.comparisons.fetch_add(1, Ordering::SeqCst);
            Ok(hashed == format!("hashed:{plain}"))
        }

        fn placeholder_hash(&self) -> &str {
            "placeholder"
        }
    }
}
