//! Validation of individual configuration values

use crate::error::{Error, Result};
use serde_json::Value;

/// Coerce a `stata_check_log_lines` value into a positive line count.
///
/// Accepts integers, floats without a fractional part and strings holding either. Anything
/// below one is rejected here so a bad value fails before the first task runs.
pub fn coerce_check_log_lines(value: &Value) -> Result<usize> {
    let number = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral_float)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral_float))
        }
        _ => None,
    };

    match number {
        Some(lines) if lines >= 1 => usize::try_from(lines).map_err(|_| invalid_lines(value)),
        _ => Err(invalid_lines(value)),
    }
}

/// Coerce a `stata_keep_log` value into a flag
pub fn coerce_keep_log(value: &Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(flag) => Ok(*flag),
        other => Err(Error::ConfigError(format!(
            "'stata_keep_log' must be true or false, got {other}"
        ))),
    }
}

fn integral_float(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn invalid_lines(value: &Value) -> Error {
    Error::ConfigError(format!(
        "'stata_check_log_lines' must be a positive integer, got {value}"
    ))
}
