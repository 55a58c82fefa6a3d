//! Enumerated field members
//!
//! The lookup table is built once when the field is declared. It maps each
//! member's value, each member's name, and the member itself (which is
//! represented by its value) to the member. Booleans are never accepted,
//! so `true` can not stand in for an integer member `1`. For the same
//! reason a member value must be a string or a number: anything else could
//! be produced by a cast but never accepted back.

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::{json_type_name, ModelError, ModelResult};

/// One member of an enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    name: String,
    value: Value,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical raw form stored in documents.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Enumeration declaration with its conversion table.
#[derive(Debug, Clone)]
pub struct EnumSpec {
    members: Vec<EnumMember>,
    by_value: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl EnumSpec {
    pub fn new(members: Vec<EnumMember>) -> Self {
        let mut by_value = HashMap::new();
        let mut by_name = HashMap::new();
        for (position, member) in members.iter().enumerate() {
            by_value.entry(lookup_key(&member.value)).or_insert(position);
            by_name.entry(member.name.clone()).or_insert(position);
        }
        Self {
            members,
            by_value,
            by_name,
        }
    }

    /// Builds the table, rejecting members whose value cannot be looked up.
    pub fn checked(members: Vec<EnumMember>) -> ModelResult<Self> {
        for member in &members {
            if !matches!(member.value, Value::String(_) | Value::Number(_)) {
                return Err(ModelError::invalid_declaration(
                    &member.name,
                    format!(
                        "enum member value must be a string or number, got {}",
                        json_type_name(&member.value)
                    ),
                ));
            }
        }
        Ok(Self::new(members))
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Looks up the member matching `value`.
    pub fn lookup(&self, value: &Value) -> ModelResult<&EnumMember> {
        let position = match value {
            Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
            Value::String(name) => self
                .by_value
                .get(&lookup_key(value))
                .or_else(|| self.by_name.get(name)),
            Value::Number(_) => self.by_value.get(&lookup_key(value)),
        };
        position
            .map(|p| &self.members[*p])
            .ok_or_else(|| ModelError::type_mismatch(self.expected(), value))
    }

    /// Finds the member stored as `raw`.
    pub fn member_for(&self, raw: &Value) -> Option<&EnumMember> {
        self.by_value
            .get(&lookup_key(raw))
            .map(|p| &self.members[*p])
    }

    fn expected(&self) -> String {
        let names: Vec<&str> = self.members.iter().map(|m| m.name.as_str()).collect();
        format!("one of [{}]", names.join(", "))
    }
}

/// Table key for a member value. Integral floats key like integers.
fn lookup_key(value: &Value) -> String {
    if let Some(f) = value.as_f64() {
        if !value.is_i64() && !value.is_u64() && f.fract() == 0.0 && f.abs() < 9.0e15 {
            return (f as i64).to_string();
        }
    }
    value.to_string()
}
