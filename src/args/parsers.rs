use std::time::Duration;

use serde_json::Value;

use super::types::{PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, InspectError, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

pub(super) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

/// Like [`parse_duration_arg`], but zero is a valid answer.
pub(super) fn parse_grace_arg(s: &str) -> AppResult<Duration> {
    parse_grace_value(s).map_err(AppError::from)
}

pub(crate) fn parse_grace_value(s: &str) -> Result<Duration, ValidationError> {
    match parse_duration_value(s) {
        Err(ValidationError::DurationZero) => Ok(Duration::ZERO),
        other => other,
    }
}

/// Parses `key=value` filters. The value is read as JSON when it parses,
/// so `--where id=5` compares against a number and `--where by=alice`
/// against a string.
pub(super) fn parse_filter(s: &str) -> Result<(String, Value), InspectError> {
    let Some((key, raw)) = s.split_once('=') else {
        return Err(InspectError::InvalidFilter {
            value: s.to_owned(),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(InspectError::InvalidFilter {
            value: s.to_owned(),
        });
    }
    let value =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_err| Value::String(raw.to_owned()));
    Ok((key.to_owned(), value))
}

pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut digits_len = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits_len = digits_len.saturating_add(1);
        } else {
            break;
        }
    }
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
