//! Runtime configuration for the console process.
//!
//! # Responsibility
//! - Carry the storage path, prompt and logging settings into startup.
//! - Resolve relative log directories against the working directory.

use crate::console::DEFAULT_PROMPT;
use crate::logging::default_log_level;
use crate::storage::DEFAULT_STORAGE_FILE;
use std::io;
use std::path::PathBuf;

/// Settings assembled by the binary before the store is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON document holding every record.
    pub storage_path: PathBuf,
    pub prompt: String,
    pub log_level: String,
    /// File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_FILE),
            prompt: DEFAULT_PROMPT.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Absolute log directory, or `None` when file logging is off.
    ///
    /// # Errors
    /// - Returns the error from reading the working directory. It is only
    ///   read for a relative `log_dir`.
    pub fn resolved_log_dir(&self) -> io::Result<Option<PathBuf>> {
        self.resolve_log_dir_with(std::env::current_dir)
    }

    fn resolve_log_dir_with<F>(&self, cwd: F) -> io::Result<Option<PathBuf>>
    where
        F: FnOnce() -> io::Result<PathBuf>,
    {
        match &self.log_dir {
            None => Ok(None),
            Some(dir) if dir.is_absolute() => Ok(Some(dir.clone())),
            Some(dir) => Ok(Some(cwd()?.join(dir))),
        }
    }
}
