//! Unit converters between stored values and what users type.
//!
//! Durations are stored as nanoseconds and edited in whole minutes. Factors
//! are stored as floats and edited as integer percentages.

use serde_json::Value;

use crate::error::ConversionError;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const SECONDS_PER_MINUTE: i64 = 60;
pub const NANOS_PER_MINUTE: i64 = NANOS_PER_SECOND * SECONDS_PER_MINUTE;

/// `minutes * 60 * 10^9`.
pub fn minutes_to_duration(minutes: i64) -> Result<i64, ConversionError> {
    if minutes < 0 {
        return Err(ConversionError::NegativeMinutes(minutes));
    }
    minutes
        .checked_mul(NANOS_PER_MINUTE)
        .ok_or(ConversionError::MinutesOverflow(minutes))
}

/// Parse typed whole minutes. Range and sign checks are left to the caller.
pub fn parse_minutes(input: &str) -> Result<i64, ConversionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::Empty);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ConversionError::InvalidMinutes(trimmed.to_string()))
}

/// Whole minutes in a stored duration, rounding down.
pub fn duration_to_minutes(stored: &Value) -> Result<i64, ConversionError> {
    let invalid = || ConversionError::InvalidDuration(stored.to_string());
    if let Some(ns) = stored.as_i64() {
        return if ns < 0 {
            Err(invalid())
        } else {
            Ok(ns / NANOS_PER_MINUTE)
        };
    }
    if let Some(ns) = stored.as_u64() {
        return Ok((ns / NANOS_PER_MINUTE as u64) as i64);
    }
    match stored.as_f64() {
        Some(ns) if ns >= 0.0 && ns.is_finite() => Ok((ns / NANOS_PER_MINUTE as f64).floor() as i64),
        _ => Err(invalid()),
    }
}

/// `round(value * 100)` as an integer string. Halves round to even.
pub fn float_to_percent(value: f64) -> String {
    format!("{}", (value * 100.0).round_ties_even() as i64)
}

/// Parse `"75"` or `"75%"` into `0.75`, rounded to six decimal places.
pub fn percent_to_float(input: &str) -> Result<f64, ConversionError> {
    let trimmed = input.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if number.is_empty() {
        return Err(ConversionError::Empty);
    }
    let percent: f64 = number
        .parse()
        .map_err(|_| ConversionError::InvalidPercent(trimmed.to_string()))?;
    if !percent.is_finite() {
        return Err(ConversionError::InvalidPercent(trimmed.to_string()));
    }
    Ok(round6(percent / 100.0))
}

/// Round to six decimal places, the precision factors are stored with.
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
