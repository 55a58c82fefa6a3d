//! Leaf cast rules
//!
//! Each function takes an arbitrary JSON value and returns its canonical
//! raw form, or a `TypeMismatch`. Canonical forms are always JSON-safe:
//! - bool: JSON boolean
//! - int: JSON integer
//! - float / timestamp: JSON float (seconds since the epoch for timestamps)
//! - string family: JSON string
//! - bytes: JSON array of integers in 0..=255
//!
//! Every cast is idempotent: casting a canonical value returns it unchanged.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::errors::{ModelError, ModelResult};

/// Boolean cast.
///
/// Text is true iff its first four characters, lowercased, are "true".
/// Everything else uses truthiness. Never fails.
pub fn cast_boolean(value: Value) -> ModelResult<Value> {
    let flag = match &value {
        Value::Bool(b) => *b,
        Value::String(s) => s.chars().take(4).collect::<String>().to_lowercase() == "true",
        Value::Null => false,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    };
    Ok(Value::Bool(flag))
}

/// Integer cast. Floats truncate toward zero, text is parsed.
pub fn cast_integer(value: Value) -> ModelResult<Value> {
    if value.is_i64() || value.is_u64() {
        return Ok(value);
    }
    match &value {
        Value::Number(n) => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            let truncated = f.trunc();
            if f.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                Ok(Value::from(truncated as i64))
            } else {
                Err(ModelError::type_mismatch("int", &value))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ModelError::type_mismatch("int", &value)),
        Value::Bool(b) => Ok(Value::from(*b as i64)),
        _ => Err(ModelError::type_mismatch("int", &value)),
    }
}

/// Float cast. Non-finite results are rejected since JSON cannot carry them.
pub fn cast_float(value: Value) -> ModelResult<Value> {
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ModelError::type_mismatch("float", &value))
}

/// String cast.
///
/// A byte sequence decodes as UTF-8, scalars stringify, and other
/// structures stringify to compact JSON.
pub fn cast_string(value: Value) -> ModelResult<Value> {
    match value {
        Value::String(_) => Ok(value),
        Value::Array(ref items) => match byte_sequence(items) {
            Some(bytes) => String::from_utf8(bytes)
                .map(Value::String)
                .map_err(|_| ModelError::type_mismatch("utf-8 string", &value)),
            None => Ok(Value::String(value.to_string())),
        },
        Value::Number(n) => Ok(Value::String(n.to_string())),
        other => Ok(Value::String(other.to_string())),
    }
}

/// Bytes cast. Text encodes as UTF-8, byte sequences pass through.
pub fn cast_bytes(value: Value) -> ModelResult<Value> {
    match &value {
        Value::String(s) => Ok(encode_bytes(s.as_bytes())),
        Value::Array(items) => byte_sequence(items)
            .map(|bytes| encode_bytes(&bytes))
            .ok_or_else(|| ModelError::type_mismatch("bytes", &value)),
        _ => Err(ModelError::type_mismatch("bytes", &value)),
    }
}

/// JSON-text cast. The text is parsed only to check it is well formed.
pub fn cast_json_text(value: Value) -> ModelResult<Value> {
    let text = cast_string(value)?;
    if let Value::String(s) = &text {
        if serde_json::from_str::<Value>(s).is_err() {
            return Err(ModelError::type_mismatch("json text", &text));
        }
    }
    Ok(text)
}

/// Timestamp cast: seconds since the epoch, or RFC 3339 text.
pub fn cast_timestamp(value: Value) -> ModelResult<Value> {
    if let Value::String(s) = &value {
        if s.trim().parse::<f64>().is_err() {
            let parsed = DateTime::parse_from_rfc3339(s.trim())
                .map_err(|_| ModelError::type_mismatch("timestamp", &value))?;
            let seconds = parsed.timestamp() as f64
                + f64::from(parsed.timestamp_subsec_nanos()) / 1_000_000_000.0;
            return cast_float(Value::from(seconds));
        }
    }
    cast_float(value.clone()).map_err(|_| ModelError::type_mismatch("timestamp", &value))
}

/// Decodes a canonical bytes value.
pub fn decode_bytes(value: &Value) -> Option<Vec<u8>> {
    value.as_array().and_then(|items| byte_sequence(items))
}

/// Decodes a canonical timestamp value.
pub fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = value.as_f64()?;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
}

/// Encodes a timestamp into its canonical raw form.
pub fn encode_timestamp(at: DateTime<Utc>) -> Value {
    let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) / 1_000_000_000.0;
    Number::from_f64(seconds).map_or(Value::Null, Value::Number)
}

fn encode_bytes(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|b| Value::from(*b)).collect())
}

/// Reads an array as a byte sequence if every item is an integer in 0..=255.
fn byte_sequence(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}
