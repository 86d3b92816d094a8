pub mod cookies;
pub mod errors;
pub mod identity;
pub mod pipeline;
pub mod responses;
pub mod rest;
pub mod router;
pub mod sessions;
pub mod state;
pub mod status;
pub mod tasks;
pub mod users;

// Re-export what the binaries and the integration tests build on.
pub use router::app;
pub use state::AppState;
