//! Domain model for stored records.
//!
//! # Responsibility
//! - Define the closed set of record kinds and their attribute schemas.
//! - Define the record shape shared by every kind.
//!
//! # Invariants
//! - Every record is identified by the composite key `Kind.id`.
//! - Schema lookups replace runtime inspection of default values.

pub mod kind;
pub mod record;
pub mod value;
