//! Console line parsing.
//!
//! # Responsibility
//! - Turn both surface forms into one `Invocation` shape:
//!   `<verb> <Kind> [id] [args...]` and `<Kind>.<verb>(<args>)`.
//! - Tokenize arguments shell-style, keeping `{...}` segments as mappings.
//!
//! # Invariants
//! - A quote groups characters only when a matching quote follows it;
//!   otherwise it is kept as a literal character.
//! - `{` opens a mapping only where the attribute name is expected.
//! - Canonical words are split on whitespace alone; braces elsewhere are
//!   literal. The dotted form strips stray braces.

use once_cell::sync::Lazy;
use regex::Regex;

static DOTTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\.(\w+)\((.*)\)\s*$").expect("valid dotted command regex"));

const MAPPING_SEPARATORS: &[char] = &[',', ':'];

/// Tokenizing rules for one surface form.
#[derive(Debug, Clone, Copy)]
pub struct Syntax {
    separators: &'static [char],
    /// Argument index at which `{` opens a mapping.
    mapping_slot: usize,
    /// Drop braces outside a mapping instead of keeping them in words.
    strip_braces: bool,
}

/// `<verb> <Kind> <id> ...`: arguments start at the kind.
pub const CANONICAL: Syntax = Syntax {
    separators: &[],
    mapping_slot: 2,
    strip_braces: false,
};

/// `<Kind>.<verb>(...)`: arguments start at the id.
pub const DOTTED: Syntax = Syntax {
    separators: &['(', ')', ',', ':'],
    mapping_slot: 1,
    strip_braces: true,
};

/// One parsed argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Word(String),
    /// Inline `{key: value, ...}` mapping. A trailing key without a value
    /// keeps `None`.
    Mapping(Vec<(String, Option<String>)>),
}

impl Arg {
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(word) => Some(word.as_str()),
            Self::Mapping(_) => None,
        }
    }
}

/// Normalized command: verb plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub verb: String,
    pub args: Vec<Arg>,
}

/// Parses `<verb> <args...>`. Returns `None` for blank lines.
///
/// A leading `?` is read as `help`.
pub fn parse_canonical(line: &str) -> Option<Invocation> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(rest) = line.strip_prefix('?') {
        return Some(Invocation {
            verb: "help".to_string(),
            args: split_args(rest, CANONICAL),
        });
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (line, ""),
    };
    Some(Invocation {
        verb: verb.to_string(),
        args: split_args(rest, CANONICAL),
    })
}

/// Parses `<Kind>.<verb>(<args>)`.
///
/// The kind becomes the first argument, so the result matches what
/// `<verb> <Kind> <args>` would produce.
pub fn parse_dotted(line: &str) -> Option<Invocation> {
    let captures = DOTTED_RE.captures(line)?;
    let mut args = vec![Arg::Word(captures[1].to_string())];
    args.extend(split_args(&captures[3], DOTTED));
    Some(Invocation {
        verb: captures[2].to_string(),
        args,
    })
}

/// Splits argument text on whitespace and the separators of `syntax`.
pub fn split_args(text: &str, syntax: Syntax) -> Vec<Arg> {
    let mut args = Vec::new();
    let mut outer = WordLexer::new(syntax.separators);
    let mut mapping: Option<WordLexer<'_>> = None;

    for (index, c) in text.char_indices() {
        let closes = is_quote(c) && text[index + c.len_utf8()..].contains(c);

        if let Some(lexer) = mapping.as_mut() {
            if c == '}' && !lexer.in_quote() {
                let words = lexer.take_words();
                mapping = None;
                args.push(Arg::Mapping(pair_words(words)));
            } else {
                lexer.feed(c, closes);
            }
            continue;
        }

        let at_mapping_slot = !outer.in_quote()
            && !outer.in_word()
            && args.len() + outer.word_count() == syntax.mapping_slot;
        match c {
            '{' if at_mapping_slot => {
                args.extend(outer.take_words().into_iter().map(Arg::Word));
                mapping = Some(WordLexer::new(MAPPING_SEPARATORS));
            }
            '{' | '}' if syntax.strip_braces && !outer.in_quote() => outer.feed(' ', false),
            _ => outer.feed(c, closes),
        }
    }

    // Unterminated mapping still yields what was typed.
    if let Some(mut lexer) = mapping {
        args.push(Arg::Mapping(pair_words(lexer.take_words())));
    }
    args.extend(outer.take_words().into_iter().map(Arg::Word));
    args
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn pair_words(words: Vec<String>) -> Vec<(String, Option<String>)> {
    let mut pairs = Vec::with_capacity(words.len().div_ceil(2));
    let mut words = words.into_iter();
    while let Some(key) = words.next() {
        pairs.push((key, words.next()));
    }
    pairs
}

struct WordLexer<'a> {
    separators: &'a [char],
    words: Vec<String>,
    current: String,
    started: bool,
    quote: Option<char>,
}

impl<'a> WordLexer<'a> {
    fn new(separators: &'a [char]) -> Self {
        Self {
            separators,
            words: Vec::new(),
            current: String::new(),
            started: false,
            quote: None,
        }
    }

    fn in_quote(&self) -> bool {
        self.quote.is_some()
    }

    fn in_word(&self) -> bool {
        self.started
    }

    fn word_count(&self) -> usize {
        self.words.len()
    }

    /// `closes` tells whether a matching quote appears later in the text.
    fn feed(&mut self, c: char, closes: bool) {
        if let Some(quote) = self.quote {
            if c == quote {
                self.quote = None;
            } else {
                self.current.push(c);
            }
            return;
        }

        if is_quote(c) && closes {
            self.quote = Some(c);
            self.started = true;
        } else if c.is_whitespace() || self.separators.contains(&c) {
            self.flush();
        } else {
            self.current.push(c);
            self.started = true;
        }
    }

    fn flush(&mut self) {
        if self.started {
            self.words.push(std::mem::take(&mut self.current));
            self.started = false;
        }
    }

    fn take_words(&mut self) -> Vec<String> {
        self.flush();
        self.quote = None;
        std::mem::take(&mut self.words)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_canonical, parse_dotted, Arg, Invocation};

    fn word(value: &str) -> Arg {
        Arg::Word(value.to_string())
    }

    #[test]
    fn canonical_splits_on_whitespace_and_honors_quotes() {
        let invocation = parse_canonical(r#"update User 1234 first_name "Betty Holberton""#).unwrap();
        assert_eq!(invocation.verb, "update");
        assert_eq!(
            invocation.args,
            vec![
                word("User"),
                word("1234"),
                word("first_name"),
                word("Betty Holberton"),
            ]
        );
    }

    #[test]
    fn blank_line_is_not_a_command() {
        assert_eq!(parse_canonical(""), None);
        assert_eq!(parse_canonical("   \t"), None);
    }

    #[test]
    fn question_mark_is_help() {
        let invocation = parse_canonical("?show").unwrap();
        assert_eq!(invocation.verb, "help");
        assert_eq!(invocation.args, vec![word("show")]);
    }

    #[test]
    fn dotted_and_canonical_forms_normalize_identically() {
        let dotted = parse_dotted(r#"User.update("1234", "email", "a@b.com")"#).unwrap();
        let canonical = parse_canonical("update User 1234 email a@b.com").unwrap();
        assert_eq!(dotted, canonical);
    }

    #[test]
    fn dotted_without_arguments_only_carries_kind() {
        assert_eq!(
            parse_dotted("Place.count()").unwrap(),
            Invocation {
                verb: "count".to_string(),
                args: vec![word("Place")],
            }
        );
    }

    #[test]
    fn dotted_rejects_other_shapes() {
        assert_eq!(parse_dotted("User.all"), None);
        assert_eq!(parse_dotted("all User"), None);
        assert_eq!(parse_dotted(".all()"), None);
    }

    #[test]
    fn mapping_argument_is_kept_structured() {
        let invocation = parse_dotted(
            r#"Place.update("p1", {"name": "Loft, downtown", 'max_guest': 4, "latitude": 1.5})"#,
        )
        .unwrap();
        assert_eq!(
            invocation.args,
            vec![
                word("Place"),
                word("p1"),
                Arg::Mapping(vec![
                    ("name".to_string(), Some("Loft, downtown".to_string())),
                    ("max_guest".to_string(), Some("4".to_string())),
                    ("latitude".to_string(), Some("1.5".to_string())),
                ]),
            ]
        );
    }

    #[test]
    fn mapping_with_dangling_key_keeps_none() {
        let invocation = parse_canonical(r#"update User u1 {"email": "x", "age"}"#).unwrap();
        assert_eq!(
            invocation.args[2],
            Arg::Mapping(vec![
                ("email".to_string(), Some("x".to_string())),
                ("age".to_string(), None),
            ])
        );
    }

    #[test]
    fn braces_inside_quotes_stay_literal() {
        let invocation = parse_canonical(r#"update User u1 bio "{not a map}""#).unwrap();
        assert_eq!(invocation.args[3], word("{not a map}"));
    }

    #[test]
    fn canonical_braces_outside_the_mapping_position_are_literal() {
        let invocation = parse_canonical("update User u1 nickname a}b").unwrap();
        assert_eq!(
            invocation.args,
            vec![word("User"), word("u1"), word("nickname"), word("a}b")]
        );

        let invocation = parse_canonical("update User u1 bio {x}").unwrap();
        assert_eq!(invocation.args[3], word("{x}"));

        let invocation = parse_canonical("show User{ u1").unwrap();
        assert_eq!(invocation.args, vec![word("User{"), word("u1")]);
    }

    #[test]
    fn mapping_opens_only_in_attribute_position() {
        let canonical = parse_canonical(r#"update User u1 {"age": 3}"#).unwrap();
        let dotted = parse_dotted(r#"User.update("u1", {"age": 3})"#).unwrap();
        assert_eq!(canonical, dotted);
        assert!(matches!(canonical.args[2], Arg::Mapping(_)));
    }

    #[test]
    fn dotted_form_strips_stray_braces() {
        let invocation = parse_dotted("User.show({u1})").unwrap();
        assert_eq!(invocation.args, vec![word("User"), word("u1")]);
    }

    #[test]
    fn dotted_form_splits_unquoted_arguments_on_commas_and_colons() {
        let comma = parse_dotted("City.update(c1, name, SF)").unwrap();
        let colon = parse_dotted("City.update(c1: name: SF)").unwrap();
        let canonical = parse_canonical("update City c1 name SF").unwrap();
        assert_eq!(comma, canonical);
        assert_eq!(colon, canonical);
    }

    #[test]
    fn unmatched_quote_is_kept_as_a_character() {
        let invocation = parse_canonical("update User u1 last_name O'Brien").unwrap();
        assert_eq!(invocation.args[3], word("O'Brien"));

        let invocation = parse_canonical(r#"update User u1 title 12" screen"#).unwrap();
        assert_eq!(&invocation.args[3..], &[word("12\""), word("screen")]);
    }

    #[test]
    fn empty_quotes_produce_empty_word() {
        let invocation = parse_canonical(r#"update User u1 last_name """#).unwrap();
        assert_eq!(invocation.args[3], word(""));
    }
}
