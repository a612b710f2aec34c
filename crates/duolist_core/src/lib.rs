//! Core state and persistence for the duolist work/travel to-do app.
//! This crate owns the view model; the mobile UI only renders it.

pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Mode, Task, TaskKey, TaskMapping, TaskValidationError};
pub use persist::{PersistError, PersistResult, TaskPersistence};
pub use service::todo_service::{
    AppState, Clock, Mutation, PersistStatus, SystemClock, TodoService,
};
pub use store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, StoreResult};

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
