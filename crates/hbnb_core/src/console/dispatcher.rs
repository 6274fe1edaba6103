//! Command dispatcher and read loop.
//!
//! # Responsibility
//! - Route parsed invocations to command handlers.
//! - Validate arguments in a fixed order and print one diagnostic on failure.
//! - Persist the store after every mutating command.
//!
//! # Invariants
//! - Validation order: class name, class, id, instance, attribute, value.
//! - Update applies all of its changes or none of them.
//! - Command failures never end the loop.
//! - A failed save restores the in-memory state the command started from.

use super::error::{CommandError, CommandResult};
use super::parse::{parse_canonical, parse_dotted, Arg};
use crate::model::kind::Kind;
use crate::model::record::{composite_key, is_protected, Record};
use crate::model::value::{repr_str, AttrValue};
use crate::storage::ObjectStore;
use log::{debug, info, warn};
use std::io::{self, BufRead, Write};

/// Prompt printed before each line is read.
pub const DEFAULT_PROMPT: &str = "(hbnb) ";

/// Whether the read loop should keep going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Console verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
    Help,
    Quit,
    Eof,
}

impl Command {
    /// Help listing order.
    pub const ALL: [Command; 9] = [
        Command::Eof,
        Command::All,
        Command::Count,
        Command::Create,
        Command::Destroy,
        Command::Help,
        Command::Quit,
        Command::Show,
        Command::Update,
    ];

    pub fn parse(verb: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == verb)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Show => "show",
            Self::Destroy => "destroy",
            Self::All => "all",
            Self::Count => "count",
            Self::Update => "update",
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Eof => "EOF",
        }
    }

    /// Verbs reachable through `<Kind>.<verb>(...)`.
    pub fn accepts_dotted(self) -> bool {
        matches!(
            self,
            Self::Create | Self::Show | Self::Destroy | Self::All | Self::Count | Self::Update
        )
    }

    fn usage(self) -> &'static str {
        match self {
            Self::Create => {
                "Creates a new instance, saves it and prints its id.\n\
                 Usage: create <class> | <class>.create()"
            }
            Self::Show => {
                "Prints the string form of an instance.\n\
                 Usage: show <class> <id> | <class>.show(<id>)"
            }
            Self::Destroy => {
                "Deletes an instance and saves the change.\n\
                 Usage: destroy <class> <id> | <class>.destroy(<id>)"
            }
            Self::All => {
                "Prints the string form of every instance, optionally of one class.\n\
                 Usage: all | all <class> | <class>.all()"
            }
            Self::Count => {
                "Prints the number of instances of a class.\n\
                 Usage: count <class> | <class>.count()"
            }
            Self::Update => {
                "Sets one attribute, or every pair of a mapping, on an instance.\n\
                 Usage: update <class> <id> <attribute> <value>\n\
                 \x20      update <class> <id> {<attribute>: <value>, ...}\n\
                 \x20      <class>.update(<id>, <attribute>, <value>)\n\
                 \x20      <class>.update(<id>, {<attribute>: <value>, ...})"
            }
            Self::Help => "Lists commands, or prints usage for one.\nUsage: help [command]",
            Self::Quit => "Exits the console.",
            Self::Eof => "Exits the console at end of input.",
        }
    }
}

/// Line-oriented command interpreter over an object store.
pub struct Console<S, W> {
    store: S,
    out: W,
    prompt: String,
}

impl<S: ObjectStore, W: Write> Console<S, W> {
    pub fn new(store: S, out: W) -> Self {
        Self {
            store,
            out,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn into_parts(self) -> (S, W) {
        (self.store, self.out)
    }

    /// Reads and executes lines until `quit`, `EOF` or end of input.
    ///
    /// # Errors
    /// - Returns I/O errors from reading input or writing output.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        let mut line = String::new();
        loop {
            write!(self.out, "{}", self.prompt)?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                self.execute(Command::Eof, &[])?;
                return Ok(());
            }

            if self.onecmd(line.trim_end_matches(&['\n', '\r'][..]))? == Flow::Stop {
                return Ok(());
            }
        }
    }

    /// Executes one line and reports whether the loop should continue.
    ///
    /// # Errors
    /// - Returns I/O errors from writing output. Command failures are printed.
    pub fn onecmd(&mut self, line: &str) -> io::Result<Flow> {
        let Some(invocation) = parse_canonical(line) else {
            return Ok(Flow::Continue);
        };
        if let Some(command) = Command::parse(&invocation.verb) {
            return self.execute(command, &invocation.args);
        }

        if let Some(dotted) = parse_dotted(line) {
            if let Some(command) = Command::parse(&dotted.verb).filter(|c| c.accepts_dotted()) {
                return self.execute(command, &dotted.args);
            }
        }

        debug!("event=command module=console status=unknown_syntax");
        writeln!(self.out, "*** Unknown syntax: {} **", line.trim())?;
        Ok(Flow::Continue)
    }

    fn execute(&mut self, command: Command, args: &[Arg]) -> io::Result<Flow> {
        let result = match command {
            Command::Quit => return Ok(Flow::Stop),
            Command::Eof => {
                writeln!(self.out)?;
                return Ok(Flow::Stop);
            }
            Command::Help => {
                self.help(args)?;
                return Ok(Flow::Continue);
            }
            Command::Create => self.create(args),
            Command::Show => self.show(args),
            Command::Destroy => self.destroy(args),
            Command::All => self.all(args),
            Command::Count => self.count(args),
            Command::Update => self.update(args),
        };

        match result {
            Ok(Some(output)) => writeln!(self.out, "{output}")?,
            Ok(None) => {}
            Err(err) => {
                debug!(
                    "event=command module=console status=rejected verb={} error_code={}",
                    command.name(),
                    err.code()
                );
                writeln!(self.out, "{err}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn create(&mut self, args: &[Arg]) -> CommandResult<Option<String>> {
        let kind = require_kind(args)?;
        let record = Record::new(kind);
        let id = record.id.clone();
        let key = record.key();
        self.store.insert(record);
        self.persist(|store| {
            store.remove(&key);
        })?;

        info!("event=record_create module=console status=ok kind={kind} id={id}");
        Ok(Some(id))
    }

    fn show(&self, args: &[Arg]) -> CommandResult<Option<String>> {
        let key = self.require_key(args)?;
        let record = self.store.get(&key).ok_or(CommandError::NoInstanceFound)?;
        Ok(Some(record.to_string()))
    }

    fn destroy(&mut self, args: &[Arg]) -> CommandResult<Option<String>> {
        let key = self.require_key(args)?;
        let removed = self.store.remove(&key);
        self.persist(|store| {
            if let Some(record) = removed {
                store.insert(record);
            }
        })?;

        info!("event=record_destroy module=console status=ok key={key}");
        Ok(None)
    }

    fn all(&self, args: &[Arg]) -> CommandResult<Option<String>> {
        let filter = match args.first() {
            Some(arg) => Some(
                arg.as_word()
                    .and_then(Kind::parse)
                    .ok_or(CommandError::ClassDoesNotExist)?,
            ),
            None => None,
        };

        let rendered = self
            .store
            .all()
            .values()
            .filter(|record| filter.map_or(true, |kind| record.kind == kind))
            .map(|record| repr_str(&record.to_string()))
            .collect::<Vec<_>>();
        Ok(Some(format!("[{}]", rendered.join(", "))))
    }

    fn count(&self, args: &[Arg]) -> CommandResult<Option<String>> {
        let name = args.first().ok_or(CommandError::ClassNameMissing)?;
        let count = name
            .as_word()
            .map_or(0, |kind_name| self.store.count_kind(kind_name));
        Ok(Some(count.to_string()))
    }

    fn update(&mut self, args: &[Arg]) -> CommandResult<Option<String>> {
        let key = self.require_key(args)?;
        let changes: Vec<(&str, &str)> = match args.get(2) {
            None => return Err(CommandError::AttributeNameMissing),
            Some(Arg::Mapping(pairs)) if pairs.is_empty() => {
                return Err(CommandError::AttributeNameMissing)
            }
            Some(Arg::Mapping(pairs)) => pairs
                .iter()
                .map(|(name, value)| {
                    value
                        .as_deref()
                        .map(|value| (name.as_str(), value))
                        .ok_or(CommandError::ValueMissing)
                })
                .collect::<CommandResult<_>>()?,
            Some(Arg::Word(name)) => {
                let value = args
                    .get(3)
                    .and_then(Arg::as_word)
                    .ok_or(CommandError::ValueMissing)?;
                vec![(name.as_str(), value)]
            }
        };

        let record = self
            .store
            .get_mut(&key)
            .ok_or(CommandError::NoInstanceFound)?;
        let kind = record.kind;
        let original = record.clone();
        let coerced = changes
            .into_iter()
            .map(|(name, raw)| coerce_attribute(kind, name, raw))
            .collect::<CommandResult<Vec<_>>>()?;

        let changed = coerced.len();
        for (name, value) in coerced {
            record
                .set_attribute(&name, value)
                .map_err(|err| CommandError::ReadOnlyAttribute(err.0))?;
        }
        record.touch();
        self.persist(|store| store.insert(original))?;

        info!("event=record_update module=console status=ok key={key} attributes={changed}");
        Ok(None)
    }

    /// Saves the store; on failure applies `rollback` before reporting.
    fn persist(&mut self, rollback: impl FnOnce(&mut S)) -> CommandResult<()> {
        if let Err(err) = self.store.save() {
            warn!("event=store_save module=console status=rolled_back error={err}");
            rollback(&mut self.store);
            return Err(err.into());
        }
        Ok(())
    }

    fn help(&mut self, args: &[Arg]) -> io::Result<()> {
        let Some(topic) = args.first() else {
            let names = Command::ALL.map(Command::name).join("  ");
            writeln!(self.out)?;
            writeln!(self.out, "Documented commands (type help <topic>):")?;
            writeln!(self.out, "========================================")?;
            writeln!(self.out, "{names}")?;
            return writeln!(self.out);
        };

        match topic.as_word().and_then(Command::parse) {
            Some(command) => writeln!(self.out, "{}", command.usage()),
            None => writeln!(
                self.out,
                "*** No help on {}",
                topic.as_word().unwrap_or_default()
            ),
        }
    }

    /// Validates `<class> <id>` and returns the composite key of an existing record.
    fn require_key(&self, args: &[Arg]) -> CommandResult<String> {
        let kind = require_kind(args)?;
        let id = args
            .get(1)
            .ok_or(CommandError::InstanceIdMissing)?
            .as_word()
            .ok_or(CommandError::NoInstanceFound)?;

        let key = composite_key(kind, id);
        if self.store.get(&key).is_none() {
            return Err(CommandError::NoInstanceFound);
        }
        Ok(key)
    }
}

fn require_kind(args: &[Arg]) -> CommandResult<Kind> {
    args.first()
        .ok_or(CommandError::ClassNameMissing)?
        .as_word()
        .and_then(Kind::parse)
        .ok_or(CommandError::ClassDoesNotExist)
}

/// Types one update pair against the kind schema; untyped names stay strings.
fn coerce_attribute(kind: Kind, name: &str, raw: &str) -> CommandResult<(String, AttrValue)> {
    if is_protected(name) {
        return Err(CommandError::ReadOnlyAttribute(name.to_string()));
    }
    let value = match kind.attribute_type(name) {
        Some(scalar) => scalar
            .coerce(raw)
            .map_err(|source| CommandError::InvalidValue {
                attribute: name.to_string(),
                source,
            })?,
        None => AttrValue::Str(raw.to_string()),
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::{coerce_attribute, Command};
    use crate::console::error::CommandError;
    use crate::model::kind::Kind;
    use crate::model::value::AttrValue;

    #[test]
    fn command_names_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::parse(command.name()), Some(command));
        }
        assert_eq!(Command::parse("eof"), None);
        assert!(!Command::Quit.accepts_dotted());
        assert!(Command::Update.accepts_dotted());
    }

    #[test]
    fn coerce_attribute_follows_schema() {
        assert_eq!(
            coerce_attribute(Kind::Place, "price_by_night", "120").unwrap(),
            ("price_by_night".to_string(), AttrValue::Int(120))
        );
        assert_eq!(
            coerce_attribute(Kind::Place, "nickname", "42").unwrap(),
            ("nickname".to_string(), AttrValue::Str("42".to_string()))
        );
    }

    #[test]
    fn coerce_attribute_reports_protected_and_bad_values() {
        assert!(matches!(
            coerce_attribute(Kind::User, "created_at", "now"),
            Err(CommandError::ReadOnlyAttribute(name)) if name == "created_at"
        ));
        let err = coerce_attribute(Kind::Place, "latitude", "north").unwrap_err();
        assert_eq!(err.to_string(), "** invalid value for latitude **");
    }
}
