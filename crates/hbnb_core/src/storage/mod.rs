//! Object store contracts and the JSON file implementation.
//!
//! # Responsibility
//! - Own the authoritative `Kind.id -> Record` mapping.
//! - Mirror that mapping to and from durable storage.
//!
//! # Invariants
//! - Keys are always `record.key()` of the stored record.
//! - `reload()` either replaces the whole mapping or leaves it untouched.
//!
//! # See also
//! - `console` for the only mutating caller.

use crate::model::record::Record;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file_storage;

pub use file_storage::{FileStorage, DEFAULT_STORAGE_FILE};

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence error for store load/save.
#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    InvalidData(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json(err) => write!(f, "malformed storage document: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored object: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Store interface consumed by the console dispatcher.
pub trait ObjectStore {
    /// Complete mapping, ordered by composite key.
    fn all(&self) -> &BTreeMap<String, Record>;
    /// Registers a record under its composite key, replacing any previous one.
    fn insert(&mut self, record: Record);
    fn get(&self, key: &str) -> Option<&Record>;
    fn get_mut(&mut self, key: &str) -> Option<&mut Record>;
    fn remove(&mut self, key: &str) -> Option<Record>;
    /// Serializes every record and overwrites the backing storage.
    fn save(&self) -> StorageResult<()>;
    /// Replaces the mapping with the persisted one; absent storage means empty.
    fn reload(&mut self) -> StorageResult<()>;

    /// Number of records whose kind name equals `kind_name`.
    fn count_kind(&self, kind_name: &str) -> usize {
        self.all()
            .values()
            .filter(|record| record.kind.as_str() == kind_name)
            .count()
    }
}
