//! JSON file backed object store.
//!
//! # Responsibility
//! - Keep every live record in memory, keyed by `Kind.id`.
//! - Dump the full mapping to one JSON document on `save()`.
//! - Rebuild records from that document on `reload()`.
//!
//! # Invariants
//! - `save()` writes a sibling temp file and renames it over the target, so a
//!   crash mid-write leaves the previous document intact.
//! - Each document entry is decoded by the kind named in its key.
//! - Concurrent writers are not coordinated; the last rename wins.

use super::{ObjectStore, StorageError, StorageResult};
use crate::model::kind::Kind;
use crate::model::record::Record;
use log::{error, info, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Backing file used when no path is configured.
pub const DEFAULT_STORAGE_FILE: &str = "file.json";

const CLASS_FIELD: &str = "__class__";

/// Object store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    objects: BTreeMap<String, Record>,
}

impl FileStorage {
    /// Creates an empty store bound to `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: BTreeMap::new(),
        }
    }

    /// Creates a store bound to `path` and loads any persisted records.
    ///
    /// # Errors
    /// - Propagates read/parse failures from `reload()`.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let mut storage = Self::new(path);
        storage.reload()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, document: &str) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        temp.write_all(document.as_bytes())
            .map_err(io_error(temp.path()))?;
        temp.as_file().sync_all().map_err(io_error(temp.path()))?;
        temp.persist(&self.path)
            .map_err(|err| io_error(&self.path)(err.error))?;
        Ok(())
    }
}

impl ObjectStore for FileStorage {
    fn all(&self) -> &BTreeMap<String, Record> {
        &self.objects
    }

    fn insert(&mut self, record: Record) {
        self.objects.insert(record.key(), record);
    }

    fn get(&self, key: &str) -> Option<&Record> {
        self.objects.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.objects.get_mut(key)
    }

    fn remove(&mut self, key: &str) -> Option<Record> {
        self.objects.remove(key)
    }

    fn save(&self) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = serde_json::to_string_pretty(&self.objects)
            .map_err(StorageError::from)
            .and_then(|document| self.write_document(&document));

        match &result {
            Ok(()) => info!(
                "event=storage_save module=storage status=ok objects={} duration_ms={}",
                self.objects.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_save module=storage status=error path={} duration_ms={} error={}",
                self.path.display(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn reload(&mut self) -> StorageResult<()> {
        let started_at = Instant::now();
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "event=storage_reload module=storage status=ok mode=absent path={}",
                    self.path.display()
                );
                self.objects.clear();
                return Ok(());
            }
            Err(err) => return Err(io_error(&self.path)(err)),
        };

        let objects = match decode_document(&text) {
            Ok(objects) => objects,
            Err(err) => {
                error!(
                    "event=storage_reload module=storage status=error path={} error={}",
                    self.path.display(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=storage_reload module=storage status=ok mode=file objects={} duration_ms={}",
            objects.len(),
            started_at.elapsed().as_millis()
        );
        self.objects = objects;
        Ok(())
    }
}

fn decode_document(text: &str) -> StorageResult<BTreeMap<String, Record>> {
    let document: BTreeMap<String, Map<String, Value>> = serde_json::from_str(text)?;
    let mut objects = BTreeMap::new();
    for (key, fields) in document {
        let record = decode_entry(&key, fields)?;
        objects.insert(key, record);
    }
    Ok(objects)
}

fn decode_entry(key: &str, mut fields: Map<String, Value>) -> StorageResult<Record> {
    let (kind_name, id) = key.split_once('.').ok_or_else(|| {
        StorageError::InvalidData(format!("key `{key}` is not of the form `Kind.id`"))
    })?;
    let kind = Kind::parse(kind_name).ok_or_else(|| {
        StorageError::InvalidData(format!("unknown kind `{kind_name}` in key `{key}`"))
    })?;

    match fields.get(CLASS_FIELD) {
        None => {
            warn!("event=storage_reload module=storage status=fallback key={key} missing={CLASS_FIELD}");
            fields.insert(
                CLASS_FIELD.to_string(),
                Value::String(kind.as_str().to_string()),
            );
        }
        Some(Value::String(name)) if name == kind.as_str() => {}
        Some(other) => {
            return Err(StorageError::InvalidData(format!(
                "`{CLASS_FIELD}` value {other} does not match key `{key}`"
            )));
        }
    }

    let record: Record = serde_json::from_value(Value::Object(fields))?;
    if record.id != id {
        return Err(StorageError::InvalidData(format!(
            "id `{}` does not match key `{key}`",
            record.id
        )));
    }
    Ok(record)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::decode_entry;
    use crate::model::kind::Kind;
    use crate::storage::StorageError;
    use serde_json::{json, Map, Value};

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn decode_entry_fills_missing_class_from_key() {
        let record = decode_entry(
            "City.c1",
            fields(json!({
                "id": "c1",
                "created_at": "2024-01-01T00:00:00.000000",
                "updated_at": "2024-01-01T00:00:00.000000",
                "name": "Austin"
            })),
        )
        .unwrap();
        assert_eq!(record.kind, Kind::City);
        assert_eq!(record.id, "c1");
    }

    #[test]
    fn decode_entry_rejects_mismatched_class_and_id() {
        let base = json!({
            "__class__": "User",
            "id": "u1",
            "created_at": "2024-01-01T00:00:00.000000",
            "updated_at": "2024-01-01T00:00:00.000000"
        });

        let err = decode_entry("City.u1", fields(base.clone())).unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));

        let err = decode_entry("User.other", fields(base)).unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(ref message) if message.contains("other")));
    }

    #[test]
    fn decode_entry_rejects_unknown_kind_and_bad_key() {
        let entry = fields(json!({ "id": "x" }));
        let err = decode_entry("Ghost.x", entry.clone()).unwrap_err();
        assert!(err.to_string().contains("unknown kind `Ghost`"));

        let err = decode_entry("nodot", entry).unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }
}
