//! User-facing command diagnostics.

use crate::model::value::CoercionError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

/// Reason a command was not applied.
///
/// `Display` renders the exact line printed to the console.
#[derive(Debug)]
pub enum CommandError {
    ClassNameMissing,
    ClassDoesNotExist,
    InstanceIdMissing,
    NoInstanceFound,
    AttributeNameMissing,
    ValueMissing,
    ReadOnlyAttribute(String),
    InvalidValue {
        attribute: String,
        source: CoercionError,
    },
    Storage(StorageError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassNameMissing => f.write_str("** class name missing **"),
            Self::ClassDoesNotExist => f.write_str("** class doesn't exist **"),
            Self::InstanceIdMissing => f.write_str("** instance id missing **"),
            Self::NoInstanceFound => f.write_str("** no instance found **"),
            Self::AttributeNameMissing => f.write_str("** attribute name missing **"),
            Self::ValueMissing => f.write_str("** value missing **"),
            Self::ReadOnlyAttribute(_) => f.write_str("** attribute can't be updated **"),
            Self::InvalidValue { attribute, .. } => {
                write!(f, "** invalid value for {attribute} **")
            }
            Self::Storage(err) => write!(f, "** unable to save: {err} **"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { source, .. } => Some(source),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CommandError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl CommandError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClassNameMissing => "class_name_missing",
            Self::ClassDoesNotExist => "class_missing",
            Self::InstanceIdMissing => "instance_id_missing",
            Self::NoInstanceFound => "instance_not_found",
            Self::AttributeNameMissing => "attribute_name_missing",
            Self::ValueMissing => "value_missing",
            Self::ReadOnlyAttribute(_) => "attribute_read_only",
            Self::InvalidValue { .. } => "invalid_value",
            Self::Storage(_) => "storage_failed",
        }
    }
}
