use std::fmt;

use serde_json::Value as JsonValue;

/// Why a raw document value could not be read as a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionError {
    Missing,
    NotNumeric,
    OutOfRange,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "value is null",
            Self::NotNumeric => "value is not numeric",
            Self::OutOfRange => "value is negative or too large",
        })
    }
}

/// A numeric field after default-filling: either read from the document or
/// replaced by the field's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerced<T> {
    Value(T),
    Defaulted(T),
}

impl<T: Copy> Coerced<T> {
    pub fn resolve(raw: Option<Result<T, CoercionError>>, default: T) -> Self {
        match raw {
            Some(Ok(v)) => Self::Value(v),
            Some(Err(_)) | None => Self::Defaulted(default),
        }
    }

    pub fn get(&self) -> T {
        match *self {
            Self::Value(v) | Self::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted(_))
    }
}

pub fn coerce_u64(value: &JsonValue) -> Result<u64, CoercionError> {
    match value {
        JsonValue::Null => Err(CoercionError::Missing),
        JsonValue::Bool(b) => Ok(u64::from(*b)),
        JsonValue::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.as_i64().is_some() {
                Err(CoercionError::OutOfRange)
            } else {
                n.as_f64()
                    .ok_or(CoercionError::NotNumeric)
                    .and_then(truncate_f64)
            }
        }
        JsonValue::String(s) => parse_numeric_str(s),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(CoercionError::NotNumeric),
    }
}

/// Stricter reading for fields stored as whole numbers: a string must hold an
/// integer, while JSON floats and booleans are still accepted.
pub fn coerce_int_u64(value: &JsonValue) -> Result<u64, CoercionError> {
    match value {
        JsonValue::String(s) => parse_integer_str(s),
        other => coerce_u64(other),
    }
}

pub fn coerce_int_u32(value: &JsonValue) -> Result<u32, CoercionError> {
    let wide = coerce_int_u64(value)?;
    u32::try_from(wide).map_err(|_| CoercionError::OutOfRange)
}

fn parse_integer_str(raw: &str) -> Result<u64, CoercionError> {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(v) => Ok(v),
        Err(_) if trimmed.parse::<i64>().is_ok() => Err(CoercionError::OutOfRange),
        Err(_) => Err(CoercionError::NotNumeric),
    }
}

fn parse_numeric_str(raw: &str) -> Result<u64, CoercionError> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return Ok(v);
    }
    if trimmed.parse::<i64>().is_ok() {
        return Err(CoercionError::OutOfRange);
    }
    let float = trimmed
        .parse::<f64>()
        .map_err(|_| CoercionError::NotNumeric)?;
    truncate_f64(float)
}

fn truncate_f64(v: f64) -> Result<u64, CoercionError> {
    if !v.is_finite() {
        return Err(CoercionError::NotNumeric);
    }
    let t = v.trunc();
    if t < 0.0 || t > u64::MAX as f64 {
        return Err(CoercionError::OutOfRange);
    }
    Ok(t as u64)
}
