//! An ordered collection of options resolved together.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use crate::config;
use crate::env::{Environment, ProcessEnv};
use crate::error::Error;
use crate::flags::FlagContext;
use crate::option::{ConfigMap, Opt, OptionError};
use crate::value::Destination;

/// Handle to an option added to an [`OptionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionId(usize);

/// A set of options sharing one argument vector and flag context.
///
/// # Lifecycle
///
/// 1. Add options with [`add`](Self::add)
/// 2. Resolve them once with [`parse`](Self::parse) or
///    [`parse_using`](Self::parse_using)
/// 3. Drop the set and read the variables
///
/// # Example
///
/// ```
/// use cfgchain::{Opt, OptionSet};
///
/// let mut count = 0i32;
/// let mut set = OptionSet::new("app", ["--count", "5"]);
/// set.add(Opt::new(&mut count, "repetitions").long_flag("count").default(1));
/// set.parse(None).unwrap();
/// drop(set);
///
/// assert_eq!(count, 5);
/// ```
pub struct OptionSet<'a> {
    program: String,
    options: Vec<Opt<'a>>,
    args: Vec<String>,
    flags: FlagContext,
    env: Box<dyn Environment>,
}

impl<'a> OptionSet<'a> {
    /// Creates a set parsing `args` (without the program name).
    ///
    /// Environment variables are read from the process environment.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = program.into();
        Self {
            flags: FlagContext::new(program.clone()),
            program,
            options: Vec::new(),
            args: args.into_iter().map(Into::into).collect(),
            env: Box::new(ProcessEnv),
        }
    }

    /// Creates a set from the process's own arguments.
    #[must_use]
    pub fn from_env() -> Self {
        let mut argv = std::env::args();
        let program = argv
            .next()
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());
        Self::new(program, argv)
    }

    /// Replaces the environment variable source.
    #[must_use]
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Appends an option. No validation happens until parsing.
    pub fn add(&mut self, opt: Opt<'a>) -> OptionId {
        self.options.push(opt);
        OptionId(self.options.len() - 1)
    }

    /// Returns the option behind `id`.
    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&Opt<'a>> {
        self.options.get(id.0)
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if no options were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Parses flags, then resolves every option against `config`.
    ///
    /// # Errors
    ///
    /// Fails on the first flag registration error, flag syntax error, or
    /// option resolution error. Options after a failing one are untouched.
    pub fn parse(&mut self, config: Option<&ConfigMap>) -> Result<(), Error> {
        self.parse_flags()?;
        self.resolve_all(config)
    }

    /// Parses flags, loads the config file named by `path`, then resolves
    /// every option against it.
    ///
    /// The path option is resolved first from its own flag, environment
    /// variable and default. An empty path means no config file.
    ///
    /// # Errors
    ///
    /// In addition to the [`parse`](Self::parse) errors, fails if the path
    /// option does not resolve to a string, or if the file cannot be read
    /// or decoded.
    pub fn parse_using(&mut self, path: Option<OptionId>) -> Result<(), Error> {
        self.parse_flags()?;

        let mut file = String::new();
        if let Some(opt) = path.and_then(|id| self.options.get(id.0)) {
            opt.resolve(Some(&self.flags), None, self.env.as_ref())
                .map_err(Error::ConfigPath)?
                .assign_to(Some(&mut Destination::from(&mut file)))
                .map_err(|e| Error::ConfigPath(OptionError::Assign(e)))?;
        }

        let config = if file.is_empty() {
            ConfigMap::new()
        } else {
            config::load(Path::new(&file))?
        };

        self.resolve_all(Some(&config))
    }

    fn parse_flags(&mut self) -> Result<(), Error> {
        for opt in &mut self.options {
            opt.register_flags(Some(&mut self.flags))
                .map_err(Error::Register)?;
        }

        self.flags.parse(&self.args).map_err(Error::Flags)?;
        tracing::debug!(
            "Parsed {} arguments, {} positional",
            self.args.len(),
            self.flags.args().len()
        );
        Ok(())
    }

    fn resolve_all(&mut self, config: Option<&ConfigMap>) -> Result<(), Error> {
        for opt in &mut self.options {
            opt.parse(Some(&self.flags), config, self.env.as_ref())
                .map_err(Error::Resolve)?;
        }
        Ok(())
    }

    /// Returns the arguments left after flag parsing; empty before parsing.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.flags.args()
    }

    /// Returns the number of arguments left after flag parsing.
    #[must_use]
    pub fn narg(&self) -> usize {
        self.flags.args().len()
    }

    /// Renders the usage block of every option, in insertion order.
    #[must_use]
    pub fn usage_string(&self) -> String {
        if self.options.is_empty() {
            return "    \tNo configuration options set\n".to_owned();
        }

        self.options.iter().map(ToString::to_string).collect()
    }

    /// Writes the full usage text, headed by the program name.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn write_usage(&self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "Usage of {}:\n{}", self.program, self.usage_string())
    }

    /// Prints the usage text to stderr.
    pub fn usage(&self) {
        // Nothing sensible to do if stderr is gone.
        let _ = self.write_usage(&mut io::stderr().lock());
    }
}

impl fmt::Debug for OptionSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSet")
            .field("program", &self.program)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
