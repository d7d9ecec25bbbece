//! Text-to-value conversions shared by the binder.

use std::time::Duration;

const HOUR: i64 = 3600;
const DAY: i64 = 24 * HOUR;
/// Nominal month of 28 days.
const MONTH: i64 = 28 * DAY;
/// Nominal year of 365 days.
const YEAR: i64 = 365 * DAY;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Per-field conversion hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Convert {
    /// Integer text is a duration expression (`30d`, `1y`); the field stores seconds.
    Duration,
}

/// Conversion failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid number '{0}'")]
    Number(String),

    #[error("number out of range '{0}'")]
    Range(String),

    #[error("invalid duration '{0}'")]
    Duration(String),
}

/// Lenient boolean: `yes`, `on`, `true` and `1` (any case) are true, anything
/// else is false.
pub fn parse_bool(text: &str) -> bool {
    ["yes", "on", "true", "1"]
        .iter()
        .any(|t| text.eq_ignore_ascii_case(t))
}

/// Parse an integer, taking the base from its prefix: `0x` hex, `0o` or a
/// bare leading `0` octal, `0b` binary, otherwise decimal. An optional sign
/// and `_` separators between digits are accepted.
pub fn parse_int(text: &str) -> Result<i64, ConvertError> {
    let invalid = || ConvertError::Number(text.to_string());

    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0b") {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty()
        || digits.starts_with(['_', '+', '-'])
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }

    let digits = digits.replace('_', "");
    let magnitude = u64::from_str_radix(&digits, radix).map_err(|_| invalid())?;
    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value).map_err(|_| ConvertError::Range(text.to_string()))
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Parse a duration expression into seconds.
///
/// An integer optionally followed by one unit letter: `y` (365 days), `m`
/// (month of 28 days), `d` or `h`, in either case. Without a unit the number
/// is seconds. Any other trailing non-digit is dropped and the number taken
/// as seconds, so `10s` is 10. Units are nominal, not calendar aware.
pub fn parse_duration_expr(text: &str) -> Result<i64, ConvertError> {
    let invalid = || ConvertError::Duration(text.to_string());
    let Some(last) = text.chars().last() else {
        return Err(invalid());
    };
    if last.is_ascii_digit() {
        return parse_int(text).map_err(|_| invalid());
    }

    let unit = match last.to_ascii_lowercase() {
        'y' => YEAR,
        'm' => MONTH,
        'd' => DAY,
        'h' => HOUR,
        _ => 1,
    };

    let number = &text[..text.len() - last.len_utf8()];
    parse_int(number)
        .map_err(|_| invalid())?
        .checked_mul(unit)
        .ok_or_else(|| ConvertError::Range(text.to_string()))
}

/// Parse a unit-suffixed duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Each term is a decimal number with an optional fraction followed by one
/// of `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
pub fn parse_duration(text: &str) -> Result<Duration, ConvertError> {
    let invalid = || ConvertError::Duration(text.to_string());

    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3600 * NANOS_PER_SEC,
            _ => return Err(invalid()),
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        // digits past nanosecond precision of an hour cannot matter
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in fraction.bytes().take(18) {
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }

        total = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(numerator * scale / denominator))
            .and_then(|n| n.checked_add(total))
            .ok_or_else(invalid)?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

fn split_digits(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(end)
}
