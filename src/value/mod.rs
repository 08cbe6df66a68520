//! Typed values and the caller-owned slots they are written into.
//!
//! This module provides:
//! - The closed set of supported primitive kinds ([`Kind`])
//! - A value of one of those kinds ([`Value`])
//! - A container distinguishing "no value" from "value present" ([`Data`])
//! - A mutable borrow of a caller's variable ([`Destination`])
//!
//! # Assignment Rules
//!
//! [`Data::assign_to`] writes a value into a destination when the kinds are
//! identical, or when the conversion is a lossless numeric widening:
//!
//! | Value | Destination |
//! |---|---|
//! | `int32` | `int64`, `float64` |
//! | `uint32` | `uint64`, `int64`, `float64` |
//!
//! Every other pairing is an [`ValueError::InvalidCast`]. In particular a
//! number is never turned into a string.

mod coerce;
mod error;


use std::fmt;
use std::time::Duration;

pub use coerce::{format_duration, parse_duration};
pub use error::{SyntaxError, ValueError};

pub(crate) use coerce::parse_literal;

/// The primitive families a destination can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `bool`
    Bool,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f64`
    F64,
    /// `String`
    Str,
    /// `std::time::Duration`
    Duration,
}

impl Kind {
    /// Returns the name used in messages and usage output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F64 => "float64",
            Self::Str => "string",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of exactly one [`Kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F64(f64),
    Str(String),
    Duration(Duration),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::F64(_) => Kind::F64,
            Self::Str(_) => Kind::Str,
            Self::Duration(_) => Kind::Duration,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v:?}"),
            Self::Str(v) => f.write_str(v),
            Self::Duration(v) => f.write_str(&format_duration(*v)),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f64 => F64,
    String => Str,
    Duration => Duration,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

/// A value that may or may not have been supplied.
///
/// Unset data is never read: assigning it anywhere leaves the
/// destination untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data(Option<Value>);

impl Data {
    /// Creates data holding `value`.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Some(value.into()))
    }

    /// Creates data holding nothing.
    #[must_use]
    pub const fn unset() -> Self {
        Self(None)
    }

    /// Returns true if a value is present.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Returns the held value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// Parses `input` as a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Coercion`] carrying the literal and the
    /// underlying parse failure.
    pub fn coerce(input: &str, kind: Kind) -> Result<Self, ValueError> {
        parse_literal(input, kind)
            .map(|value| Self(Some(value)))
            .map_err(|source| ValueError::Coercion {
                literal: input.to_owned(),
                kind,
                source,
            })
    }

    /// Writes the held value into `destination`.
    ///
    /// Unset data or a missing destination is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidCast`] if the value cannot be stored in
    /// the destination's kind.
    pub fn assign_to(&self, destination: Option<&mut Destination<'_>>) -> Result<(), ValueError> {
        match (&self.0, destination) {
            (Some(value), Some(destination)) => destination.store(value),
            _ => Ok(()),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Self(Some(value))
    }
}

/// A caller-owned variable that a resolved value is written into.
///
/// Built from a mutable reference to one of the supported types:
///
/// ```
/// use cfgchain::value::{Destination, Kind};
///
/// let mut port = 0u32;
/// let destination = Destination::from(&mut port);
/// assert_eq!(destination.kind(), Kind::U32);
/// ```
#[derive(Debug)]
pub enum Destination<'a> {
    Bool(&'a mut bool),
    I32(&'a mut i32),
    I64(&'a mut i64),
    U32(&'a mut u32),
    U64(&'a mut u64),
    F64(&'a mut f64),
    Str(&'a mut String),
    Duration(&'a mut Duration),
}

impl Destination<'_> {
    /// Returns the kind of the borrowed variable.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::F64(_) => Kind::F64,
            Self::Str(_) => Kind::Str,
            Self::Duration(_) => Kind::Duration,
        }
    }

    fn store(&mut self, value: &Value) -> Result<(), ValueError> {
        match (self, value) {
            (Self::Bool(slot), Value::Bool(v)) => **slot = *v,
            (Self::I32(slot), Value::I32(v)) => **slot = *v,
            (Self::I64(slot), Value::I64(v)) => **slot = *v,
            (Self::I64(slot), Value::I32(v)) => **slot = i64::from(*v),
            (Self::I64(slot), Value::U32(v)) => **slot = i64::from(*v),
            (Self::U32(slot), Value::U32(v)) => **slot = *v,
            (Self::U64(slot), Value::U64(v)) => **slot = *v,
            (Self::U64(slot), Value::U32(v)) => **slot = u64::from(*v),
            (Self::F64(slot), Value::F64(v)) => **slot = *v,
            (Self::F64(slot), Value::I32(v)) => **slot = f64::from(*v),
            (Self::F64(slot), Value::U32(v)) => **slot = f64::from(*v),
            (Self::Str(slot), Value::Str(v)) => v.clone_into(slot),
            (Self::Duration(slot), Value::Duration(v)) => **slot = *v,
            (slot, value) => {
                return Err(ValueError::InvalidCast {
                    from: value.kind(),
                    to: slot.kind(),
                });
            }
        }
        Ok(())
    }
}

macro_rules! destination_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for Destination<'a> {
                fn from(slot: &'a mut $ty) -> Self {
                    Self::$variant(slot)
                }
            }
        )*
    };
}

destination_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f64 => F64,
    String => Str,
    Duration => Duration,
}
