//! Lenient conversion of untyped JSON values into numbers.
//!
//! Every numeric read of an upstream record goes through this module. Inputs that are
//! not numbers, not numeric strings, non-finite, or implausibly large map to `None`.

use serde_json::Value;

/// Values above this are treated as upstream corruption.
pub const SANITY_CEILING: f64 = 1e15;

/// Coerce a magnitude (volume, size, liquidity): finite, `>= 0` and `<= SANITY_CEILING`.
pub fn magnitude(value: &Value) -> Option<f64> {
    number(value).filter(|num| *num >= 0.0 && *num <= SANITY_CEILING)
}

/// Coerce a signed quantity (profit / loss): finite with `|x| <= SANITY_CEILING`.
pub fn signed(value: &Value) -> Option<f64> {
    number(value).filter(|num| num.abs() <= SANITY_CEILING)
}

/// Interpret a value as a finite number without any sign or range policy.
///
/// Used by the sort engine, which only needs to know whether two values are comparable
/// as numbers.
pub fn number(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(num) => num.as_f64()?,
        Value::String(raw) => parse_decimal(raw)?,
        _ => return None,
    };

    num.is_finite().then_some(num)
}

/// Parse a decimal string, tolerating surrounding whitespace.
///
/// The whole string must be numeric. Unlike a JavaScript `parseFloat`, a numeric prefix
/// is not accepted, so `"12 USD"` and `"2024-05-01"` are `None`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Reject the textual forms `f64::from_str` accepts ("inf", "NaN", ...)
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|num| num.is_finite())
}
