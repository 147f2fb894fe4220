//! Shared coercion rules for heterogeneous JSON values.
//!
//! Both [`ResultRecord`](crate::ResultRecord) and
//! [`Settings`](crate::Settings) expose the same typed accessor surface;
//! the conversion rules live here so the two stay consistent.

use serde_json::Value;

use crate::{Error, Result};

/// JSON type name used in `TypeMismatch` messages.
pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(key: &str, expected: &'static str, value: &Value) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        actual: json_type_name(value),
    }
}

/// Error for a key with no value at all.
pub(crate) fn absent(key: &str, expected: &'static str) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        actual: "absent",
    }
}

/// Coerce to `i64`: integral JSON numbers and string-encoded integers.
pub(crate) fn to_i64(key: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(key, "integer", value)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| mismatch(key, "integer", value)),
        _ => Err(mismatch(key, "integer", value)),
    }
}

/// Coerce to `f64`: any JSON number and string-encoded floats.
pub(crate) fn to_f64(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(key, "float", value)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| mismatch(key, "float", value)),
        _ => Err(mismatch(key, "float", value)),
    }
}

/// Coerce to `bool`: JSON booleans and the strings "true"/"false".
pub(crate) fn to_bool(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(mismatch(key, "boolean", value)),
        },
        _ => Err(mismatch(key, "boolean", value)),
    }
}

/// Coerce to `String`: strings pass through, numbers and booleans are
/// formatted. Nulls, arrays and objects do not coerce.
pub(crate) fn to_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(mismatch(key, "string", value)),
    }
}
