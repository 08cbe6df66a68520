//! cfgchain demo
//!
//! Prints a message resolved from command-line flags, a config file, the
//! environment, or built-in defaults.

use cfgchain::OptionSet;
use std::process::ExitCode;

mod app;

use app::{Settings, enable_verbose, exit_code, load, setup_tracing, write_message};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let log_filter = setup_tracing();

    let mut settings = Settings::default();
    let mut set = OptionSet::from_env();

    if let Err(e) = load(&mut set, &mut settings) {
        eprintln!("{e}");
        set.usage();
        return exit_code::CONFIG_ERROR;
    }
    drop(set);

    if settings.verbose {
        enable_verbose(&log_filter);
    }
    tracing::debug!("Configuration file: {}", settings.config);

    match write_message(&mut std::io::stdout().lock(), &settings) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to write message: {e}");
            exit_code::runtime_error()
        }
    }
}
