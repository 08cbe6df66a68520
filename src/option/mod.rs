//! A single configurable setting.
//!
//! An [`Opt`] binds one caller-owned variable to up to four sources and
//! resolves it with the following priority (highest to lowest):
//!
//! 1. **Command-line flag** - the short or long flag, if typed in argv
//! 2. **Config file** - the value stored under the option's config key
//! 3. **Environment variable** - if set to a non-empty string
//! 4. **Default** - the value given to [`Opt::default`], if any
//!
//! Sources below the one selected are never inspected, so a malformed
//! environment variable is not an error when a flag overrides it.
//!
//! # Phases
//!
//! An option starts out *building*: the setters record flags, the
//! environment variable, the config key and the default. Registering its
//! flags against a [`FlagContext`] moves it to *bound*, after which every
//! setter is a no-op.
//!
//! # Defaults and Flags
//!
//! A default whose kind differs from the destination is accepted by
//! [`Opt::default`]. The mismatch is only reported when a flag has to be
//! registered with it, or when the default is finally assigned.

mod error;
mod json;


use std::fmt;

use crate::env::Environment;
use crate::flags::{FlagContext, FlagId, FlagName};
use crate::value::{Data, Destination, Kind, Value};

pub use error::OptionError;

/// Decoded configuration file: top-level keys to scalar values.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default)]
struct Settings {
    short: Option<char>,
    long: Option<String>,
    env_var: Option<String>,
    config_key: Option<String>,
    default: Option<Value>,
}

#[derive(Debug)]
enum Stage {
    Building,
    Bound {
        short: Option<FlagId>,
        long: Option<FlagId>,
    },
}

/// One configuration value resolvable from flag, config, environment or default.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use cfgchain::Opt;
///
/// let mut count = 0i32;
/// let mut opt = Opt::new(&mut count, "number of repetitions")
///     .long_flag("count")
///     .env_var("COUNT")
///     .default(1);
///
/// opt.parse(None, None, &HashMap::<String, String>::new()).unwrap();
/// drop(opt);
/// assert_eq!(count, 1);
/// ```
#[derive(Debug)]
pub struct Opt<'a> {
    description: String,
    destination: Option<Destination<'a>>,
    settings: Settings,
    stage: Stage,
}

impl<'a> Opt<'a> {
    /// Creates an option writing into `destination`.
    ///
    /// The description is used in usage output and error messages.
    pub fn new(destination: impl Into<Destination<'a>>, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            destination: Some(destination.into()),
            settings: Settings::default(),
            stage: Stage::Building,
        }
    }

    /// Creates an option with no destination.
    ///
    /// It renders in usage output but fails to resolve.
    pub fn unbound(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            destination: None,
            settings: Settings::default(),
            stage: Stage::Building,
        }
    }

    /// Sets both the short and the long flag.
    #[must_use]
    pub fn flags(self, short: char, long: &str) -> Self {
        self.configure(|s| {
            s.short = Some(short);
            s.long = Some(long.to_owned());
        })
    }

    /// Sets the short flag, replacing any previous one.
    #[must_use]
    pub fn short_flag(self, name: char) -> Self {
        self.configure(|s| s.short = Some(name))
    }

    /// Sets the long flag, replacing any previous one.
    #[must_use]
    pub fn long_flag(self, name: &str) -> Self {
        self.configure(|s| s.long = Some(name.to_owned()))
    }

    /// Sets the environment variable read by this option.
    #[must_use]
    pub fn env_var(self, name: &str) -> Self {
        self.configure(|s| s.env_var = Some(name.to_owned()))
    }

    /// Sets the key looked up in the config file.
    #[must_use]
    pub fn config_key(self, key: &str) -> Self {
        self.configure(|s| s.config_key = Some(key.to_owned()))
    }

    /// Sets the value used when no other source supplies one.
    #[must_use]
    pub fn default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.configure(|s| s.default = Some(value))
    }

    fn configure(mut self, edit: impl FnOnce(&mut Settings)) -> Self {
        match self.stage {
            Stage::Building => edit(&mut self.settings),
            Stage::Bound { .. } => {
                tracing::debug!("Option '{}' is bound, ignoring change", self.description);
            }
        }
        self
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the destination's kind, or `None` for an unbound option.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.destination.as_ref().map(Destination::kind)
    }

    /// Returns the short flag.
    #[must_use]
    pub const fn short(&self) -> Option<char> {
        self.settings.short
    }

    /// Returns the long flag.
    #[must_use]
    pub fn long(&self) -> Option<&str> {
        self.settings.long.as_deref()
    }

    /// Returns the environment variable name.
    #[must_use]
    pub fn env_name(&self) -> Option<&str> {
        self.settings.env_var.as_deref()
    }

    /// Returns the config key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.settings.config_key.as_deref()
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.settings.default.as_ref()
    }

    /// Returns true once flags have been registered; setters are then no-ops.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self.stage, Stage::Bound { .. })
    }

    /// Registers the short and long flags with `flags`.
    ///
    /// Without a context this succeeds and does nothing. An option that is
    /// already bound is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag is configured but the option has no
    /// destination, or if a flag cannot be registered (duplicate or invalid
    /// name, default of another kind).
    pub fn register_flags(&mut self, flags: Option<&mut FlagContext>) -> Result<(), OptionError> {
        let Some(flags) = flags else {
            return Ok(());
        };
        if self.is_bound() {
            return Ok(());
        }

        let short = self.settings.short.map(FlagName::Short);
        let long = self.settings.long.as_deref().map(FlagName::Long);

        let short = self.define_flag(flags, short, "short")?;
        let long = self.define_flag(flags, long, "long")?;

        self.stage = Stage::Bound { short, long };
        Ok(())
    }

    fn define_flag(
        &self,
        flags: &mut FlagContext,
        name: Option<FlagName<'_>>,
        position: &'static str,
    ) -> Result<Option<FlagId>, OptionError> {
        let Some(name) = name else {
            return Ok(None);
        };
        let kind = self.kind().ok_or_else(|| self.missing_destination())?;
        let default = self.settings.default.as_ref();

        flags
            .define(name, kind, default, &self.description)
            .map(Some)
            .map_err(|source| OptionError::Flag { position, source })
    }

    /// Resolves this option's value without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the option has no destination, the config value
    /// has the wrong type, or the environment variable does not parse.
    pub fn resolve(
        &self,
        flags: Option<&FlagContext>,
        config: Option<&ConfigMap>,
        env: &dyn Environment,
    ) -> Result<Data, OptionError> {
        let kind = self.kind().ok_or_else(|| self.missing_destination())?;

        if let Some(data) = flags.and_then(|flags| self.flag_value(flags)) {
            tracing::debug!("Option '{}' set by flag", self.description);
            return Ok(data);
        }

        if let Some(value) = self.config_value(config, kind)? {
            tracing::debug!("Option '{}' set by config file", self.description);
            return Ok(Data::from(value));
        }

        if let Some(data) = self.env_value(env, kind)? {
            tracing::debug!("Option '{}' set by environment", self.description);
            return Ok(data);
        }

        Ok(self
            .settings
            .default
            .clone()
            .map_or_else(Data::unset, Data::from))
    }

    /// Resolves this option and writes the result into its destination.
    ///
    /// Nothing is written when resolution fails or no source supplies a
    /// value.
    ///
    /// # Errors
    ///
    /// Returns any [`resolve`](Self::resolve) error, or
    /// [`OptionError::Assign`] if the value does not fit the destination.
    pub fn parse(
        &mut self,
        flags: Option<&FlagContext>,
        config: Option<&ConfigMap>,
        env: &dyn Environment,
    ) -> Result<(), OptionError> {
        let data = self.resolve(flags, config, env)?;
        data.assign_to(self.destination.as_mut())
            .map_err(OptionError::Assign)
    }

    /// Picks the flag typed last, if either was typed at all.
    fn flag_value(&self, flags: &FlagContext) -> Option<Data> {
        let Stage::Bound { short, long } = &self.stage else {
            return None;
        };

        [short, long]
            .into_iter()
            .flatten()
            .filter_map(|id| flags.visited(id).map(|position| (position, id)))
            .max_by_key(|(position, _)| *position)
            .and_then(|(_, id)| flags.value(id))
            .map(Data::from)
    }

    fn config_value(
        &self,
        config: Option<&ConfigMap>,
        kind: Kind,
    ) -> Result<Option<Value>, OptionError> {
        let Some(key) = self.settings.config_key.as_deref() else {
            return Ok(None);
        };
        let Some(raw) = config.and_then(|c| c.get(key)) else {
            return Ok(None);
        };

        json::convert(raw, kind)
            .map(Some)
            .ok_or_else(|| OptionError::ConfigType {
                key: key.to_owned(),
                found: json::type_name(raw),
                kind,
            })
    }

    fn env_value(&self, env: &dyn Environment, kind: Kind) -> Result<Option<Data>, OptionError> {
        let Some(name) = self.settings.env_var.as_deref() else {
            return Ok(None);
        };

        match env.var(name) {
            Some(raw) if !raw.is_empty() => {
                Data::coerce(&raw, kind)
                    .map(Some)
                    .map_err(|source| OptionError::Env {
                        name: name.to_owned(),
                        source,
                    })
            }
            _ => Ok(None),
        }
    }

    fn missing_destination(&self) -> OptionError {
        OptionError::MissingDestination {
            description: self.description.clone(),
        }
    }
}

/// Renders the usage block for this option.
///
/// The first line holds the flags and kind, indented by two spaces. The
/// second line is indented by four spaces and a tab:
///
/// ```text
///   -c, --count int32
///         number of repetitions (env COUNT, config key "count") (default 1)
/// ```
impl fmt::Display for Opt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = match (self.settings.short, self.settings.long.as_deref()) {
            (Some(s), Some(l)) => format!("-{s}, --{l}"),
            (Some(s), None) => format!("-{s}"),
            (None, Some(l)) => format!("--{l}"),
            (None, None) => "No CLI option".to_owned(),
        };

        write!(f, "  {flags}")?;
        if let Some(kind) = self.kind() {
            write!(f, " {kind}")?;
        }
        write!(f, "\n    \t{}", self.description)?;

        match (
            self.settings.env_var.as_deref(),
            self.settings.config_key.as_deref(),
        ) {
            (Some(env), Some(key)) => write!(f, " (env {env}, config key {key:?})")?,
            (Some(env), None) => write!(f, " (env {env})")?,
            (None, Some(key)) => write!(f, " (config key {key:?})")?,
            (None, None) => {}
        }

        match &self.settings.default {
            Some(Value::Str(s)) => write!(f, " (default {s:?})")?,
            Some(value) => write!(f, " (default {value})")?,
            None => {}
        }

        writeln!(f)
    }
}
