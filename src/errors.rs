//! Error types for the casting engine
//!
//! Error codes:
//! - DRAUGHTS_CONSTRUCTION_TYPE (positional argument is not an object)
//! - DRAUGHTS_MISSING_FIELD (no value, default or factory for a field)
//! - DRAUGHTS_UNEXPECTED_KEY (key outside the declared field set)
//! - DRAUGHTS_TYPE_MISMATCH (a cast failed)
//! - DRAUGHTS_INDEX_OUT_OF_BOUNDS (list index past the end)
//! - DRAUGHTS_INVALID_DECLARATION (model or field declaration rejected)
//! - DRAUGHTS_SERIALIZATION (JSON encoding failed)
//!
//! Every error is raised synchronously and propagates to the caller of
//! the triggering operation. Nothing is retried or recovered internally.

use serde_json::Value;
use thiserror::Error;

/// Path used for a value that has not been attached to a field yet.
const ROOT_PATH: &str = "$";

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Casting, construction and declaration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Positional construction argument is not a mapping
    #[error("Cannot construct '{model}' from {found}: expected an object")]
    ConstructionType { model: String, found: &'static str },

    /// Required field has no resolvable value
    #[error("Missing key [{field}] to construct {model}")]
    MissingField { field: String, model: String },

    /// Document or named values contain undeclared keys
    #[error("Unexpected key provided to {model}: {}", .keys.join(", "))]
    UnexpectedKey { model: String, keys: Vec<String> },

    /// A cast failed
    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field path (e.g. "values[2].key"), "$" for a bare value
        path: String,
        expected: String,
        actual: String,
    },

    /// List position past the end
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Model or field declaration rejected by the compiler or loader
    #[error("Invalid declaration of '{model}': {reason}")]
    InvalidDeclaration { model: String, reason: String },

    /// JSON encoding failed
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Creates a type mismatch for a bare value.
    pub fn type_mismatch(expected: impl Into<String>, actual: &Value) -> Self {
        ModelError::TypeMismatch {
            path: ROOT_PATH.to_string(),
            expected: expected.into(),
            actual: describe_value(actual),
        }
    }

    pub fn missing_field(field: impl Into<String>, model: impl Into<String>) -> Self {
        ModelError::MissingField {
            field: field.into(),
            model: model.into(),
        }
    }

    pub fn unexpected_keys(model: impl Into<String>, mut keys: Vec<String>) -> Self {
        keys.sort();
        ModelError::UnexpectedKey {
            model: model.into(),
            keys,
        }
    }

    pub fn invalid_declaration(model: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidDeclaration {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the path of a type mismatch with a field name.
    ///
    /// Other error kinds pass through unchanged.
    pub fn at(self, segment: &str) -> Self {
        match self {
            ModelError::TypeMismatch {
                path,
                expected,
                actual,
            } => ModelError::TypeMismatch {
                path: join_path(segment, &path),
                expected,
                actual,
            },
            other => other,
        }
    }

    /// Prefixes the path of a type mismatch with a list position.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            ModelError::TypeMismatch {
                path,
                expected,
                actual,
            } => {
                let segment = format!("[{}]", index);
                let path = if path == ROOT_PATH {
                    segment
                } else if path.starts_with('[') {
                    format!("{}{}", segment, path)
                } else {
                    format!("{}.{}", segment, path)
                };
                ModelError::TypeMismatch {
                    path,
                    expected,
                    actual,
                }
            }
            other => other,
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::ConstructionType { .. } => "DRAUGHTS_CONSTRUCTION_TYPE",
            ModelError::MissingField { .. } => "DRAUGHTS_MISSING_FIELD",
            ModelError::UnexpectedKey { .. } => "DRAUGHTS_UNEXPECTED_KEY",
            ModelError::TypeMismatch { .. } => "DRAUGHTS_TYPE_MISMATCH",
            ModelError::IndexOutOfBounds { .. } => "DRAUGHTS_INDEX_OUT_OF_BOUNDS",
            ModelError::InvalidDeclaration { .. } => "DRAUGHTS_INVALID_DECLARATION",
            ModelError::Serialization(_) => "DRAUGHTS_SERIALIZATION",
        }
    }

    /// Returns the field path of a type mismatch
    pub fn path(&self) -> Option<&str> {
        match self {
            ModelError::TypeMismatch { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Serialization(e.to_string())
    }
}

/// Joins a parent segment onto an existing path.
fn join_path(segment: &str, path: &str) -> String {
    if path == ROOT_PATH {
        segment.to_string()
    } else if path.starts_with('[') {
        format!("{}{}", segment, path)
    } else {
        format!("{}.{}", segment, path)
    }
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Short description of a value: its type, plus the value itself for scalars.
fn describe_value(value: &Value) -> String {
    match value {
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            let mut text = value.to_string();
            if text.chars().count() > 40 {
                text = text.chars().take(37).collect::<String>() + "...";
            }
            format!("{} {}", json_type_name(value), text)
        }
        other => json_type_name(other).to_string(),
    }
}
