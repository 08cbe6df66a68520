//! Error types for registering and resolving a single option.

use thiserror::Error;

use crate::flags::FlagError;
use crate::value::{Kind, ValueError};

/// Error type for [`Opt`](super::Opt) operations.
///
/// Each variant is terminal for the option that produced it.
#[derive(Debug, Error)]
pub enum OptionError {
    /// The option was created without a destination.
    #[error("option with description '{description}' not registered with a value")]
    MissingDestination {
        /// Description of the offending option
        description: String,
    },

    /// One of the option's flags could not be registered.
    #[error("failed to set {position} flag: {source}")]
    Flag {
        /// `"short"` or `"long"`
        position: &'static str,
        /// Underlying registration error
        #[source]
        source: FlagError,
    },

    /// The config file value has the wrong type for the destination.
    #[error(
        "failed to parse option config: cannot convert config type {found} to {kind} for '{key}'"
    )]
    ConfigType {
        /// The config key
        key: String,
        /// JSON type of the config value
        found: &'static str,
        /// Kind of the destination
        kind: Kind,
    },

    /// The environment variable does not parse as the destination kind.
    #[error("failed to parse environment option '{name}': {source}")]
    Env {
        /// Name of the environment variable
        name: String,
        /// Underlying coercion error
        #[source]
        source: ValueError,
    },

    /// The resolved value could not be written to the destination.
    #[error("failed to set option: {0}")]
    Assign(#[source] ValueError),
}
