//! String to value conversion, dispatched on [`Kind`].

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::{Kind, SyntaxError, Value};

/// A complete duration: one or more `<number><unit>` terms.
const DURATION_GRAMMAR: &str = r"^(?:(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:ns|us|µs|μs|ms|s|m|h))+$";

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DURATION_GRAMMAR)
        .expect("duration grammar is a valid regex")
});

/// A single `<number><unit>` term.
static TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]*)(?:\.([0-9]*))?(ns|us|µs|μs|ms|s|m|h)")
        .expect("duration term is a valid regex")
});

/// Fraction digits beyond this are dropped.
const MAX_FRACTION_DIGITS: usize = 18;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

pub fn parse_literal(input: &str, kind: Kind) -> Result<Value, SyntaxError> {
    let value = match kind {
        Kind::Bool => Value::Bool(parse_bool(input)?),
        Kind::I32 => Value::I32(input.parse()?),
        Kind::I64 => Value::I64(input.parse()?),
        Kind::U32 => Value::U32(input.parse()?),
        Kind::U64 => Value::U64(input.parse()?),
        Kind::F64 => Value::F64(input.parse()?),
        Kind::Str => Value::Str(input.to_owned()),
        Kind::Duration => Value::Duration(parse_duration(input)?),
    };
    Ok(value)
}

fn parse_bool(input: &str) -> Result<bool, SyntaxError> {
    match input {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(SyntaxError::Bool),
    }
}

/// Parses a compound duration such as `"60s"`, `"1h30m"` or `"1.5ms"`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is accepted; any other number needs a unit.
///
/// # Errors
///
/// Returns [`SyntaxError::Duration`] on malformed input, negative values,
/// or durations that do not fit in `u64` nanoseconds. A negative zero such
/// as `"-0s"` is zero.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use cfgchain::value::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, SyntaxError> {
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    if body == "0" {
        return Ok(Duration::ZERO);
    }
    if !DURATION.is_match(body) {
        return Err(SyntaxError::Duration("invalid duration"));
    }

    let mut total: u128 = 0;
    for term in TERM.captures_iter(body) {
        let whole = term.get(1).map_or("", |m| m.as_str());
        let fraction = term.get(2).map_or("", |m| m.as_str());
        let unit = term.get(3).map_or("", |m| m.as_str());

        total = term_nanos(whole, fraction, unit_nanos(unit))
            .and_then(|nanos| total.checked_add(nanos))
            .ok_or(SyntaxError::Duration("duration out of range"))?;
    }

    if negative && total > 0 {
        return Err(SyntaxError::Duration("negative duration"));
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| SyntaxError::Duration("duration out of range"))
}

fn unit_nanos(unit: &str) -> u128 {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        _ => 3_600 * NANOS_PER_SEC,
    };
    u128::from(nanos)
}

fn term_nanos(whole: &str, fraction: &str, unit: u128) -> Option<u128> {
    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().ok()?
    };
    let mut nanos = whole.checked_mul(unit)?;

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let digits = u32::try_from(fraction.len()).ok()?;
        let scale = 10u128.pow(digits);
        let numerator = fraction.parse::<u128>().ok()?;
        nanos = nanos.checked_add(numerator * unit / scale)?;
    }

    Some(nanos)
}

/// Renders a duration in the compound form accepted by [`parse_duration`].
///
/// ```
/// use std::time::Duration;
/// use cfgchain::value::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m0s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
/// assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let nanos = u64::from(duration.subsec_nanos());

    if secs == 0 {
        return match nanos {
            0 => "0s".to_owned(),
            n if n < NANOS_PER_MICRO => format!("{n}ns"),
            n if n < NANOS_PER_MILLI => format!(
                "{}{}µs",
                n / NANOS_PER_MICRO,
                fraction(n % NANOS_PER_MICRO, 3)
            ),
            n => format!(
                "{}{}ms",
                n / NANOS_PER_MILLI,
                fraction(n % NANOS_PER_MILLI, 6)
            ),
        };
    }

    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    let seconds = format!("{seconds}{}s", fraction(nanos, 9));
    match (hours, minutes) {
        (0, 0) => seconds,
        (0, minutes) => format!("{minutes}m{seconds}"),
        (hours, minutes) => format!("{hours}h{minutes}m{seconds}"),
    }
}

/// Formats `value` as a decimal fraction of `width` digits, trailing zeros trimmed.
fn fraction(value: u64, width: usize) -> String {
    let digits = format!("{value:0width$}");
    let digits = digits.trim_end_matches('0');
    if digits.is_empty() {
        String::new()
    } else {
        format!(".{digits}")
    }
}
