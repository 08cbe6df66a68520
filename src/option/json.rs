//! Conversion of decoded config file values.

use std::time::Duration;

use serde_json::{Number, Value as Json};

use crate::value::{Kind, Value};

/// Converts a config entry into a value of `kind`.
///
/// Returns `None` when the JSON type cannot represent `kind`, or when a
/// number is out of range or not integral for an integer kind. Durations
/// are read as integer nanoseconds.
pub fn convert(raw: &Json, kind: Kind) -> Option<Value> {
    match (kind, raw) {
        (Kind::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
        (Kind::Str, Json::String(s)) => Some(Value::Str(s.clone())),
        (Kind::F64, Json::Number(n)) => n.as_f64().map(Value::F64),
        (Kind::I32, Json::Number(n)) => integer(n)
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::I32),
        (Kind::I64, Json::Number(n)) => integer(n)
            .and_then(|i| i64::try_from(i).ok())
            .map(Value::I64),
        (Kind::U32, Json::Number(n)) => integer(n)
            .and_then(|i| u32::try_from(i).ok())
            .map(Value::U32),
        (Kind::U64, Json::Number(n)) => integer(n)
            .and_then(|i| u64::try_from(i).ok())
            .map(Value::U64),
        (Kind::Duration, Json::Number(n)) => integer(n)
            .and_then(|i| u64::try_from(i).ok())
            .map(|nanos| Value::Duration(Duration::from_nanos(nanos))),
        _ => None,
    }
}

/// Returns the JSON type name used in error messages.
pub const fn type_name(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Reads an integral number; floats qualify when they have no fraction.
#[allow(clippy::cast_possible_truncation)]
fn integer(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }

    let f = n.as_f64()?;
    let in_range = f >= -(2f64.powi(63)) && f < 2f64.powi(64);
    (in_range && f.fract() == 0.0).then_some(f as i128)
}
