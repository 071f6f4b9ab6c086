//! Core domain logic for the task assignment board.
//! This crate is the single source of truth for business invariants.

pub mod board;
pub mod config;
pub mod context;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod session;
pub mod store;

pub use board::{
    BoardError, BoardNotice, BoardResult, ListItem, LoadState, SyncMode, TaskBoard, TaskForm,
    UserOption, DELETE_CONFIRM_PROMPT, VALIDATION_MESSAGE,
};
pub use config::{AppConfig, ConfigError};
pub use context::AppContext;
pub use identity::{AuthError, AuthResult, IdentityClient, Session, SqliteIdentityClient};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::{Document, DocumentFields};
pub use model::record::{
    new_user_fields, RecordId, TaskStatus, TaskUpdate, UserTaskRecord, USERS_COLLECTION,
};
pub use navigation::Route;
pub use session::{GateForm, SessionGate, SessionMarkerStore, LOGIN_FAILED_MESSAGE};
pub use store::{DocumentStore, SqliteDocumentStore, StoreError, StoreResult, Subscription};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
