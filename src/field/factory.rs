//! Named value factories
//!
//! Factories are zero-argument producers consulted by the construction
//! protocol when a field has neither a value nor a default.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::catalog::encode_timestamp;

/// Random v4 identifier as text.
pub fn uuid4() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Current time as seconds since the epoch.
pub fn now() -> Value {
    encode_timestamp(Utc::now())
}

/// Empty list, for containers that should start out empty.
pub fn empty_list() -> Value {
    Value::Array(Vec::new())
}

/// Empty mapping.
pub fn empty_mapping() -> Value {
    Value::Object(serde_json::Map::new())
}
