//! Command-line flag parsing using clap.
//!
//! Options are only known at run time, so flags are registered one by one
//! with clap's builder API rather than derived from a struct. Every flag
//! name (short or long) becomes its own [`clap::Arg`], which lets an option
//! tell which of its names was actually typed.
//!
//! # Syntax
//!
//! - `-f value`, `-f=value`, `--flag value`, `--flag=value`
//! - Boolean flags need no value (`--verbose`), or take one with `=`
//!   (`--verbose=false`)
//! - Parsing stops at the first positional argument or at `--`; everything
//!   after it is returned by [`FlagContext::args`]

use std::collections::HashSet;
use std::fmt;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use thiserror::Error;

use crate::value::{Kind, Value, parse_literal};

/// Argument id collecting the non-flag arguments.
const POSITIONAL: &str = "positional";

/// A flag name as configured on an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagName<'a> {
    /// Single-character flag, typed as `-c`
    Short(char),
    /// Long flag, typed as `--name`
    Long(&'a str),
}

impl FlagName<'_> {
    /// Returns the flag as typed on the command line.
    #[must_use]
    pub fn id(self) -> FlagId {
        match self {
            Self::Short(c) => FlagId(format!("-{c}")),
            Self::Long(name) => FlagId(format!("--{name}")),
        }
    }

    fn validate(self) -> Result<(), &'static str> {
        match self {
            Self::Short('-') => Err("'-' cannot be a short flag"),
            Self::Short(c) if c.is_whitespace() || c.is_control() => {
                Err("short flag must be a printable character")
            }
            Self::Long("") => Err("long flag cannot be empty"),
            Self::Long(name) if name.starts_with('-') => Err("long flag cannot start with '-'"),
            Self::Long(name) if name.contains('=') => Err("long flag cannot contain '='"),
            Self::Long(name) if name.chars().any(char::is_whitespace) => {
                Err("long flag cannot contain whitespace")
            }
            Self::Short(_) | Self::Long(_) => Ok(()),
        }
    }
}

/// Identifies a flag registered with a [`FlagContext`].
///
/// Displays as the flag is typed, e.g. `-c` or `--count`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagId(String);

impl FlagId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for flag registration.
#[derive(Debug, Error)]
pub enum FlagError {
    /// The flag name is already registered.
    #[error("flag redefined: {0}")]
    Duplicate(FlagId),

    /// The flag name cannot be used.
    #[error("invalid flag name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// The option default does not have the flag's kind.
    #[error("cannot use default option {value} ({found}) as {kind} for flag {flag}")]
    DefaultType {
        /// The default as rendered text
        value: String,
        /// Kind of the default
        found: Kind,
        /// Kind of the flag
        kind: Kind,
        /// The flag being registered
        flag: FlagId,
    },
}

/// The flag-parsing context shared by all options of a set.
///
/// Flags are registered with [`define`](Self::define), then the argument
/// vector is parsed once with [`parse`](Self::parse).
#[derive(Debug)]
pub struct FlagContext {
    command: Command,
    defined: HashSet<FlagId>,
    matches: Option<ArgMatches>,
    positional: Vec<String>,
}

impl FlagContext {
    /// Creates an empty context for a program called `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        let command = Command::new(program.into())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .color(ColorChoice::Never)
            .arg(
                Arg::new(POSITIONAL)
                    .value_name("ARGS")
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .trailing_var_arg(true),
            );

        Self {
            command,
            defined: HashSet::new(),
            matches: None,
            positional: Vec::new(),
        }
    }

    /// Registers a flag holding values of `kind`.
    ///
    /// The default, if any, must already have the flag's kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unusable, already registered, or the
    /// default has a different kind.
    pub fn define(
        &mut self,
        name: FlagName<'_>,
        kind: Kind,
        default: Option<&Value>,
        help: &str,
    ) -> Result<FlagId, FlagError> {
        let id = name.id();

        name.validate().map_err(|reason| FlagError::InvalidName {
            name: match name {
                FlagName::Short(c) => c.to_string(),
                FlagName::Long(l) => l.to_owned(),
            },
            reason,
        })?;

        if let Some(value) = default.filter(|v| v.kind() != kind) {
            return Err(FlagError::DefaultType {
                value: value.to_string(),
                found: value.kind(),
                kind,
                flag: id,
            });
        }

        if self.defined.contains(&id) {
            return Err(FlagError::Duplicate(id));
        }

        let mut arg = Arg::new(id.as_str().to_owned())
            .action(ArgAction::Set)
            .value_name(kind.name())
            .value_parser(move |s: &str| parse_literal(s, kind))
            .help(help.to_owned());

        arg = match name {
            FlagName::Short(c) => arg.short(c),
            FlagName::Long(l) => arg.long(l.to_owned()),
        };

        arg = if kind == Kind::Bool {
            arg.num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
        } else {
            // The next argument is always the value, even if it looks like a flag.
            arg.allow_hyphen_values(true)
        };

        if let Some(value) = default {
            arg = arg.default_value(value.to_string());
        }

        tracing::trace!("Registered flag {id} ({kind})");

        self.command = std::mem::replace(&mut self.command, Command::new("")).arg(arg);
        self.defined.insert(id.clone());
        Ok(id)
    }

    /// Parses `args` against the registered flags.
    ///
    /// May be called again; the previous result is replaced.
    ///
    /// # Errors
    ///
    /// Returns clap's error for unknown flags, missing values, or values
    /// that do not parse as the flag's kind.
    pub fn parse(&mut self, args: &[String]) -> Result<(), clap::Error> {
        let matches = self.command.clone().try_get_matches_from(args)?;

        self.positional = matches
            .get_many::<String>(POSITIONAL)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        self.matches = Some(matches);
        Ok(())
    }

    /// Returns true once [`parse`](Self::parse) has succeeded.
    #[must_use]
    pub const fn is_parsed(&self) -> bool {
        self.matches.is_some()
    }

    /// Returns the argv position of `id` if it was typed on the command line.
    ///
    /// Flags that only carry their default are not visited.
    #[must_use]
    pub fn visited(&self, id: &FlagId) -> Option<usize> {
        let matches = self.matches.as_ref()?;

        if matches.value_source(id.as_str()) == Some(ValueSource::CommandLine) {
            matches.index_of(id.as_str())
        } else {
            None
        }
    }

    /// Returns the current value of `id`: the parsed value, or its default.
    #[must_use]
    pub fn value(&self, id: &FlagId) -> Option<Value> {
        self.matches
            .as_ref()?
            .try_get_one::<Value>(id.as_str())
            .ok()
            .flatten()
            .cloned()
    }

    /// Returns the arguments remaining after flag parsing.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.positional
    }
}
