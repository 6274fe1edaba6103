//! Line-oriented command interpreter.
//!
//! # Responsibility
//! - Parse console lines in canonical and dotted form.
//! - Dispatch commands against an injected `ObjectStore`.
//!
//! # Invariants
//! - Diagnostics are printed, never raised; the loop survives every command error.
//!
//! # See also
//! - `storage` for persistence after mutating commands.

mod dispatcher;
mod error;
pub mod parse;

pub use dispatcher::{Command, Console, Flow, DEFAULT_PROMPT};
pub use error::{CommandError, CommandResult};
