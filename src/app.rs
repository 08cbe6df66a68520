//! Application startup and utilities.
//!
//! This module contains exit codes, the demo's option definitions, and
//! tracing setup that support the main entry point.

use std::io::{self, Write};

use cfgchain::{Error, Opt, OptionSet};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Environment variable for the message.
pub const MESSAGE_ENV: &str = "CFGCHAIN_MESSAGE";

/// Message printed when no source provides one.
pub const DEFAULT_MESSAGE: &str = "This space intentionally left blank";

/// Config file read when `-o` is not given.
pub const DEFAULT_CONFIG: &str = "./options.json";

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid flags, unreadable config file, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - output could not be written.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Values resolved for the demo.
#[derive(Debug, Default)]
pub struct Settings {
    pub message: String,
    pub count: i32,
    pub config: String,
    pub verbose: bool,
}

/// Registers the demo's options on `set` and resolves them.
///
/// `settings` stays borrowed until `set` is dropped.
pub fn load<'a>(set: &mut OptionSet<'a>, settings: &'a mut Settings) -> Result<(), Error> {
    let Settings {
        message,
        count,
        config,
        verbose,
    } = settings;

    set.add(
        Opt::new(message, "Message to print")
            .short_flag('m')
            .config_key("message")
            .env_var(MESSAGE_ENV)
            .default(DEFAULT_MESSAGE),
    );
    set.add(
        Opt::new(count, "Number of times to print the message")
            .long_flag("count")
            .config_key("count")
            .default(1),
    );
    set.add(
        Opt::new(verbose, "Enable debug logging")
            .flags('v', "verbose"),
    );
    let path = set.add(
        Opt::new(config, "Path to the configuration file")
            .short_flag('o')
            .default(DEFAULT_CONFIG),
    );

    set.parse_using(Some(path))
}

/// Writes the message `count` times, one per line.
pub fn write_message(out: &mut impl Write, settings: &Settings) -> io::Result<()> {
    for _ in 0..settings.count {
        writeln!(out, "{}", settings.message)?;
    }
    out.flush()
}

/// Handle for changing the log filter after startup.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Sets up the tracing subscriber for logging.
///
/// Runs before options are resolved, so only `RUST_LOG` applies at first.
/// The returned handle lets [`enable_verbose`] raise the level afterwards.
pub fn setup_tracing() -> FilterHandle {
    let (subscriber, handle) = build_subscriber(io::stderr);
    subscriber.init();
    handle
}

fn build_subscriber<W>(writer: W) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(env_filter(Level::WARN));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(writer));

    (subscriber, handle)
}

/// Switches the default log level to debug; `RUST_LOG` directives still apply.
pub fn enable_verbose(handle: &FilterHandle) {
    if let Err(e) = handle.reload(env_filter(Level::DEBUG)) {
        tracing::warn!("Failed to enable verbose logging: {e}");
    }
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
