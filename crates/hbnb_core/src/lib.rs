//! Core of the HBnB console: record model, JSON object store and
//! command dispatcher.

pub mod config;
pub mod console;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::AppConfig;
pub use console::{Command, CommandError, Console, Flow, DEFAULT_PROMPT};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::kind::Kind;
pub use model::record::Record;
pub use model::value::{AttrValue, CoercionError, ScalarType};
pub use storage::{FileStorage, ObjectStore, StorageError, StorageResult, DEFAULT_STORAGE_FILE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
