//! Error types for value coercion and assignment.

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use super::Kind;

/// Error type for converting and assigning [`Data`](super::Data).
#[derive(Debug, Error)]
pub enum ValueError {
    /// A string could not be parsed as the requested kind.
    #[error("cannot coerce '{literal}' to {kind}: {source}")]
    Coercion {
        /// The offending literal
        literal: String,
        /// Kind the literal was parsed as
        kind: Kind,
        /// Underlying parse failure
        #[source]
        source: SyntaxError,
    },

    /// A value is present but cannot be stored in the destination.
    #[error("invalid cast of {from} to {to}")]
    InvalidCast {
        /// Kind of the held value
        from: Kind,
        /// Kind of the destination
        to: Kind,
    },
}

/// Why a literal failed to parse.
#[derive(Debug, Error)]
pub enum SyntaxError {
    /// Not one of the accepted boolean spellings.
    #[error("invalid boolean syntax")]
    Bool,

    /// Malformed or out-of-range integer.
    #[error(transparent)]
    Int(#[from] ParseIntError),

    /// Malformed float.
    #[error(transparent)]
    Float(#[from] ParseFloatError),

    /// Malformed or out-of-range duration.
    #[error("{0}")]
    Duration(&'static str),
}
