//! Closed set of record kinds and their attribute schemas.
//!
//! # Responsibility
//! - Map console class names to a typed `Kind`.
//! - Declare which attributes are typed for each kind.
//!
//! # Invariants
//! - Kind names are matched case-sensitively.
//! - Attributes not declared in a schema are untyped (stored as strings).

use crate::model::value::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Attribute schema entry: `(attribute name, declared type)`.
pub type SchemaField = (&'static str, ScalarType);

const USER_SCHEMA: &[SchemaField] = &[
    ("email", ScalarType::Str),
    ("password", ScalarType::Str),
    ("first_name", ScalarType::Str),
    ("last_name", ScalarType::Str),
];

const STATE_SCHEMA: &[SchemaField] = &[("name", ScalarType::Str)];

const CITY_SCHEMA: &[SchemaField] = &[("state_id", ScalarType::Str), ("name", ScalarType::Str)];

const AMENITY_SCHEMA: &[SchemaField] = &[("name", ScalarType::Str)];

const PLACE_SCHEMA: &[SchemaField] = &[
    ("city_id", ScalarType::Str),
    ("user_id", ScalarType::Str),
    ("name", ScalarType::Str),
    ("description", ScalarType::Str),
    ("number_rooms", ScalarType::Int),
    ("number_bathrooms", ScalarType::Int),
    ("max_guest", ScalarType::Int),
    ("price_by_night", ScalarType::Int),
    ("latitude", ScalarType::Float),
    ("longitude", ScalarType::Float),
];

const REVIEW_SCHEMA: &[SchemaField] = &[
    ("place_id", ScalarType::Str),
    ("user_id", ScalarType::Str),
    ("text", ScalarType::Str),
];

/// Category of a stored record.
///
/// Serialized by variant name, which is also the console class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    BaseModel,
    User,
    State,
    City,
    Place,
    Amenity,
    Review,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::BaseModel,
        Kind::User,
        Kind::State,
        Kind::City,
        Kind::Place,
        Kind::Amenity,
        Kind::Review,
    ];

    /// Resolves a console class name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Place => "Place",
            Self::Amenity => "Amenity",
            Self::Review => "Review",
        }
    }

    /// Typed attributes declared for this kind.
    pub fn schema(self) -> &'static [SchemaField] {
        match self {
            Self::BaseModel => &[],
            Self::User => USER_SCHEMA,
            Self::State => STATE_SCHEMA,
            Self::City => CITY_SCHEMA,
            Self::Place => PLACE_SCHEMA,
            Self::Amenity => AMENITY_SCHEMA,
            Self::Review => REVIEW_SCHEMA,
        }
    }

    /// Declared type for `attribute`, or `None` when it is untyped.
    pub fn attribute_type(self, attribute: &str) -> Option<ScalarType> {
        self.schema()
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, scalar)| *scalar)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
