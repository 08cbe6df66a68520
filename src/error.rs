//! Error type for option set operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::option::OptionError;

/// Error type for [`OptionSet`](crate::OptionSet) operations.
///
/// The variant identifies the stage that failed; the first failure aborts
/// the whole call.
#[derive(Debug, Error)]
pub enum Error {
    /// An option's flags could not be registered.
    #[error("failed to register flags: {0}")]
    Register(#[source] OptionError),

    /// The argument vector did not parse.
    #[error("failed to parse flags: {}", summary(.0))]
    Flags(#[source] clap::Error),

    /// An option could not be resolved or assigned.
    #[error("error parsing options: {0}")]
    Resolve(#[source] OptionError),

    /// The option naming the config file did not resolve to a string.
    #[error("failed to read path for config file: {0}")]
    ConfigPath(#[source] OptionError),

    /// Failed to read the configuration file.
    #[error("error reading config '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The JSON configuration is malformed or not an object.
    #[error("error parsing config '{}': {source}", path.display())]
    JsonDecode {
        /// Path to the config file
        path: PathBuf,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// The TOML configuration is malformed.
    #[error("error parsing config '{}': {source}", path.display())]
    TomlDecode {
        /// Path to the config file
        path: PathBuf,
        /// Underlying decode error
        #[source]
        source: toml::de::Error,
    },

    /// The TOML configuration holds a NaN or infinite float.
    #[error("error parsing config '{}': non-finite float for '{key}'", path.display())]
    NonFiniteFloat {
        /// Path to the config file
        path: PathBuf,
        /// Top-level key holding the value
        key: String,
    },
}

/// First line of a clap error, without its `error: ` prefix or usage block.
fn summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_owned()
}
