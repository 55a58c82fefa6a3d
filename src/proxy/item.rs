//! Typed access to a single slot
//!
//! An `Item` pairs a raw document slot with the field that governs it.
//! Leaf slots are read straight from the raw value; compound, list and
//! mapping slots are materialized as views over the same storage, so the
//! view can never drift from the raw document.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::list::{ListMut, ListRef};
use super::mapping::{MappingMut, MappingRef};
use super::record::{RecordMut, RecordRef};
use crate::errors::ModelResult;
use crate::field::{catalog, EnumMember, Field, FieldKind};

/// Read-only view of one slot.
#[derive(Debug, Clone, Copy)]
pub struct Item<'a> {
    field: &'a Field,
    raw: &'a Value,
}

impl<'a> Item<'a> {
    pub(crate) fn new(field: &'a Field, raw: &'a Value) -> Self {
        Self { field, raw }
    }

    pub fn field(&self) -> &'a Field {
        self.field
    }

    /// The canonical raw value.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.raw.as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.raw.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.raw.as_u64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.raw.as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.raw.as_bool()
    }

    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        catalog::decode_bytes(self.raw)
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        catalog::decode_timestamp(self.raw)
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        self.raw.as_str().and_then(|s| Uuid::parse_str(s).ok())
    }

    /// The enum member stored in this slot.
    pub fn as_member(&self) -> Option<&'a EnumMember> {
        self.field.unwrapped().enum_spec()?.member_for(self.raw)
    }

    pub fn as_record(&self) -> Option<RecordRef<'a>> {
        let model = self.field.unwrapped().model()?;
        let data = self.raw.as_object()?;
        Some(RecordRef::new(model, data))
    }

    pub fn as_list(&self) -> Option<ListRef<'a>> {
        match (self.field.unwrapped().kind(), self.raw) {
            (FieldKind::List(element), Value::Array(items)) => Some(ListRef::new(element, items)),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<MappingRef<'a>> {
        match (self.field.unwrapped().kind(), self.raw) {
            (FieldKind::Mapping(element), Value::Object(map)) => {
                Some(MappingRef::new(element, map))
            }
            _ => None,
        }
    }
}

/// Mutable view of one slot. Every write goes through the field's cast.
#[derive(Debug)]
pub struct ItemMut<'a> {
    field: &'a Field,
    raw: &'a mut Value,
}

impl<'a> ItemMut<'a> {
    pub(crate) fn new(field: &'a Field, raw: &'a mut Value) -> Self {
        Self { field, raw }
    }

    pub fn view(&self) -> Item<'_> {
        Item::new(self.field, &*self.raw)
    }

    /// Casts `value` and replaces the slot. On failure the slot is untouched.
    pub fn set(&mut self, value: impl Into<Value>) -> ModelResult<()> {
        *self.raw = self.field.cast(value.into())?;
        Ok(())
    }

    pub fn into_record(self) -> Option<RecordMut<'a>> {
        let model = self.field.unwrapped().model()?;
        let data = self.raw.as_object_mut()?;
        Some(RecordMut::new(model, data))
    }

    pub fn into_list(self) -> Option<ListMut<'a>> {
        match (self.field.unwrapped().kind(), self.raw) {
            (FieldKind::List(element), Value::Array(items)) => Some(ListMut::new(element, items)),
            _ => None,
        }
    }

    pub fn into_mapping(self) -> Option<MappingMut<'a>> {
        match (self.field.unwrapped().kind(), self.raw) {
            (FieldKind::Mapping(element), Value::Object(map)) => {
                Some(MappingMut::new(element, map))
            }
            _ => None,
        }
    }
}
