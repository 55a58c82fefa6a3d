//! Sub-record views
//!
//! A record view pairs a model with the document that stores its values.
//! Field access is by declared name only; anything else is reported the
//! same way construction reports it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::item::{Item, ItemMut};
use super::list::{ListMut, ListRef};
use super::mapping::{MappingMut, MappingRef};
use crate::errors::{json_type_name, ModelError, ModelResult};
use crate::field::{EnumMember, Field};
use crate::model::Model;
use crate::Document;

/// Read-only record view.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    model: &'a Model,
    data: &'a Document,
}

impl<'a> RecordRef<'a> {
    pub(crate) fn new(model: &'a Model, data: &'a Document) -> Self {
        Self { model, data }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// The raw document behind this view.
    pub fn raw(&self) -> &'a Document {
        self.data
    }

    /// Typed access to a declared field.
    pub fn get(&self, name: &str) -> ModelResult<Item<'a>> {
        let field = declared(self.model, name)?;
        let raw = self
            .data
            .get(name)
            .ok_or_else(|| ModelError::missing_field(name, self.model.name()))?;
        Ok(Item::new(field, raw))
    }

    pub fn get_str(&self, name: &str) -> ModelResult<&'a str> {
        self.typed(name, "string", |item| item.as_str())
    }

    pub fn get_i64(&self, name: &str) -> ModelResult<i64> {
        self.typed(name, "int", |item| item.as_i64())
    }

    pub fn get_f64(&self, name: &str) -> ModelResult<f64> {
        self.typed(name, "float", |item| item.as_f64())
    }

    pub fn get_bool(&self, name: &str) -> ModelResult<bool> {
        self.typed(name, "bool", |item| item.as_bool())
    }

    pub fn get_bytes(&self, name: &str) -> ModelResult<Vec<u8>> {
        self.typed(name, "bytes", |item| item.as_bytes())
    }

    pub fn get_timestamp(&self, name: &str) -> ModelResult<DateTime<Utc>> {
        self.typed(name, "timestamp", |item| item.as_timestamp())
    }

    pub fn get_uuid(&self, name: &str) -> ModelResult<Uuid> {
        self.typed(name, "uuid", |item| item.as_uuid())
    }

    pub fn get_member(&self, name: &str) -> ModelResult<&'a EnumMember> {
        self.typed(name, "enum member", |item| item.as_member())
    }

    /// Nested record view of a compound field.
    pub fn record(&self, name: &str) -> ModelResult<RecordRef<'a>> {
        self.typed(name, "object", |item| item.as_record())
    }

    pub fn list(&self, name: &str) -> ModelResult<ListRef<'a>> {
        self.typed(name, "list", |item| item.as_list())
    }

    pub fn mapping(&self, name: &str) -> ModelResult<MappingRef<'a>> {
        self.typed(name, "mapping", |item| item.as_mapping())
    }

    /// Declared fields that hold a value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Item<'a>)> + 'a {
        let data = self.data;
        self.model.fields().iter().filter_map(move |slot| {
            data.get(slot.name())
                .map(|raw| (slot.name(), Item::new(slot.field(), raw)))
        })
    }

    /// Copy of the raw document as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &str,
        read: impl FnOnce(Item<'a>) -> Option<T>,
    ) -> ModelResult<T> {
        let item = self.get(name)?;
        read(item).ok_or_else(|| ModelError::type_mismatch(expected, item.raw()).at(name))
    }
}

/// Mutable record view.
#[derive(Debug)]
pub struct RecordMut<'a> {
    model: &'a Model,
    data: &'a mut Document,
}

impl<'a> RecordMut<'a> {
    pub(crate) fn new(model: &'a Model, data: &'a mut Document) -> Self {
        Self { model, data }
    }

    pub fn view(&self) -> RecordRef<'_> {
        RecordRef::new(self.model, &*self.data)
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// Casts `value` through the field and stores it. On failure the
    /// document is untouched.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let field = declared(self.model, name)?;
        let value = field.cast(value.into()).map_err(|e| e.at(name))?;
        self.data.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get_mut(&mut self, name: &str) -> ModelResult<ItemMut<'_>> {
        self.reborrow().into_item(name)
    }

    /// Mutable view of a compound field.
    pub fn record_mut(&mut self, name: &str) -> ModelResult<RecordMut<'_>> {
        self.reborrow().into_record_mut(name)
    }

    pub fn list_mut(&mut self, name: &str) -> ModelResult<ListMut<'_>> {
        self.reborrow().into_list_mut(name)
    }

    pub fn mapping_mut(&mut self, name: &str) -> ModelResult<MappingMut<'_>> {
        self.reborrow().into_mapping_mut(name)
    }

    /// Consumes the view, keeping the borrow of one slot.
    pub fn into_item(self, name: &str) -> ModelResult<ItemMut<'a>> {
        let field = declared(self.model, name)?;
        let model_name = self.model.name();
        let raw = self
            .data
            .get_mut(name)
            .ok_or_else(|| ModelError::missing_field(name, model_name))?;
        Ok(ItemMut::new(field, raw))
    }

    pub fn into_record_mut(self, name: &str) -> ModelResult<RecordMut<'a>> {
        let slot = self.into_item(name)?;
        let found = json_type_name(slot.view().raw());
        slot.into_record().ok_or_else(|| mismatch(name, "object", found))
    }

    pub fn into_list_mut(self, name: &str) -> ModelResult<ListMut<'a>> {
        let slot = self.into_item(name)?;
        let found = json_type_name(slot.view().raw());
        slot.into_list().ok_or_else(|| mismatch(name, "list", found))
    }

    pub fn into_mapping_mut(self, name: &str) -> ModelResult<MappingMut<'a>> {
        let slot = self.into_item(name)?;
        let found = json_type_name(slot.view().raw());
        slot.into_mapping().ok_or_else(|| mismatch(name, "mapping", found))
    }

    fn reborrow(&mut self) -> RecordMut<'_> {
        RecordMut::new(self.model, &mut *self.data)
    }
}

fn declared<'m>(model: &'m Model, name: &str) -> ModelResult<&'m Field> {
    model
        .field(name)
        .ok_or_else(|| ModelError::unexpected_keys(model.name(), vec![name.to_string()]))
}

fn mismatch(name: &str, expected: &str, found: &str) -> ModelError {
    ModelError::TypeMismatch {
        path: name.to_string(),
        expected: expected.to_string(),
        actual: found.to_string(),
    }
}
