//! Scalar attribute values and their declared types.
//!
//! # Responsibility
//! - Represent the scalar payload stored under a record attribute.
//! - Coerce raw console text into the type declared by a kind schema.
//!
//! # Invariants
//! - `AttrValue::Float` is always finite, so it survives a JSON round-trip.
//! - Untyped attributes are stored as `AttrValue::Str` verbatim.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declared scalar type of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Str,
    Int,
    Float,
}

impl ScalarType {
    /// Value an attribute reports before it is ever assigned.
    pub fn default_value(self) -> AttrValue {
        match self {
            Self::Str => AttrValue::Str(String::new()),
            Self::Int => AttrValue::Int(0),
            Self::Float => AttrValue::Float(0.0),
        }
    }

    /// Converts console text into a value of this type.
    ///
    /// # Errors
    /// - Returns `CoercionError` when the text is not a valid integer/float.
    /// - Non-finite floats (`nan`, `inf`) are rejected.
    pub fn coerce(self, raw: &str) -> Result<AttrValue, CoercionError> {
        match self {
            Self::Str => Ok(AttrValue::Str(raw.to_string())),
            Self::Int => raw
                .trim()
                .parse::<i64>()
                .map(AttrValue::Int)
                .map_err(|_| CoercionError::new(self, raw)),
            Self::Float => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(AttrValue::Float(value)),
                _ => Err(CoercionError::new(self, raw)),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
        }
    }
}

/// Raw text could not be converted to the declared attribute type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub expected: ScalarType,
    pub raw: String,
}

impl CoercionError {
    fn new(expected: ScalarType, raw: &str) -> Self {
        Self {
            expected,
            raw: raw.to_string(),
        }
    }
}

impl Display for CoercionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` is not a valid {} value",
            self.raw,
            self.expected.as_str()
        )
    }
}

impl Error for CoercionError {}

/// Scalar attribute payload.
///
/// Serialized untagged so the JSON document holds plain strings and numbers.
/// Variant order matters for decoding: integers must be tried before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Renders values the way the object string form shows them:
/// quoted strings, bare integers and floats that always keep a fraction.
impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(value) => f.write_str(&repr_str(value)),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&repr_float(*value)),
        }
    }
}

/// Quotes a string literal: single quotes unless the text holds a single
/// quote and no double quote.
pub(crate) fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Shortest round-trip float text. Positional for exponents in `-4..16`,
/// otherwise `<mantissa>e<sign><two or more digits>`.
fn repr_float(value: f64) -> String {
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if value == 0.0 || (-4..16).contains(&exponent) {
        let positional = value.to_string();
        if positional.contains('.') {
            positional
        } else {
            format!("{positional}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}
