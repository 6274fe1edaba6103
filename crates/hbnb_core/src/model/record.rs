//! Record domain model.
//!
//! # Responsibility
//! - Define the single record shape shared by every kind.
//! - Guard the identity/timestamp fields against attribute writes.
//! - Provide the console string form and the persisted JSON shape.
//!
//! # Invariants
//! - `id` is generated once and never changes.
//! - `created_at <= updated_at` for records produced by this crate.
//! - `attributes` never contains a protected name.

use crate::model::kind::Kind;
use crate::model::value::{repr_str, AttrValue};
use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Attribute names owned by the record itself.
pub const PROTECTED_ATTRIBUTES: &[&str] = &["id", "created_at", "updated_at", "__class__"];

/// Timestamp layout used in the JSON document and the string form.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Attempted write to an attribute that the record owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedAttributeError(pub String);

impl Display for ProtectedAttributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "attribute `{}` is read-only", self.0)
    }
}

impl Error for ProtectedAttributeError {}

/// Stored domain object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Serialized as `__class__` so each document entry names its kind.
    #[serde(rename = "__class__")]
    pub kind: Kind,
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    /// Kind-specific attributes, flattened next to the fixed fields on disk.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Record {
    /// Creates a record with a fresh UUID v4 and both timestamps set to now.
    pub fn new(kind: Kind) -> Self {
        let now = now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            attributes: BTreeMap::new(),
        }
    }

    /// Composite store key, `Kind.id`.
    pub fn key(&self) -> String {
        composite_key(self.kind, &self.id)
    }

    /// Sets one attribute value.
    ///
    /// # Errors
    /// - Returns `ProtectedAttributeError` for `id`, `created_at`,
    ///   `updated_at` and `__class__`.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: AttrValue,
    ) -> Result<(), ProtectedAttributeError> {
        if is_protected(name) {
            return Err(ProtectedAttributeError(name.to_string()));
        }
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Returns the assigned value, falling back to the kind schema default.
    pub fn value(&self, name: &str) -> Option<AttrValue> {
        self.attributes.get(name).cloned().or_else(|| {
            self.kind
                .attribute_type(name)
                .map(|scalar| scalar.default_value())
        })
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.created_at);
    }
}

/// `[Kind] (id) {'id': ..., 'created_at': ..., 'updated_at': ..., ...}`
impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'id': {}",
            self.kind,
            self.id,
            repr_str(&self.id)
        )?;
        write!(
            f,
            ", 'created_at': '{}', 'updated_at': '{}'",
            self.created_at.format(TIMESTAMP_FORMAT),
            self.updated_at.format(TIMESTAMP_FORMAT)
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", {}: {value}", repr_str(name))?;
        }
        f.write_str("}")
    }
}

pub fn composite_key(kind: Kind, id: &str) -> String {
    format!("{}.{}", kind.as_str(), id)
}

pub fn is_protected(name: &str) -> bool {
    PROTECTED_ATTRIBUTES.contains(&name)
}

// Truncated to the precision the JSON document keeps.
fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    // Accepts a missing fraction, which `%.f` treats as optional.
    const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, PARSE_FORMAT)
            .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{text}`: {err}")))
    }
}
