//! Owned records
//!
//! A `Record` owns its canonical document and shares its model. Reads and
//! writes go through the proxy views, so the document is the only state a
//! record has.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use super::compiled::Model;
use crate::errors::ModelResult;
use crate::field::EnumMember;
use crate::proxy::{Item, ItemMut, ListMut, ListRef, MappingMut, MappingRef, RecordMut, RecordRef};
use crate::Document;

/// A constructed record
#[derive(Debug, Clone)]
pub struct Record {
    model: Arc<Model>,
    data: Document,
}

impl Record {
    /// Constructs a record of `model` from a document.
    pub fn new(model: &Arc<Model>, document: Value) -> ModelResult<Self> {
        model.load(document)
    }

    pub(crate) fn from_parts(model: Arc<Model>, data: Document) -> Self {
        Self { model, data }
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// The canonical document.
    pub fn raw(&self) -> &Document {
        &self.data
    }

    pub fn into_raw(self) -> Document {
        self.data
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Compact JSON text of the canonical document.
    pub fn dumps(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(&self.data)?)
    }

    pub fn view(&self) -> RecordRef<'_> {
        RecordRef::new(&self.model, &self.data)
    }

    pub fn view_mut(&mut self) -> RecordMut<'_> {
        RecordMut::new(&self.model, &mut self.data)
    }

    pub fn get(&self, name: &str) -> ModelResult<Item<'_>> {
        self.view().get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        self.view_mut().set(name, value)
    }

    pub fn get_mut(&mut self, name: &str) -> ModelResult<ItemMut<'_>> {
        self.view_mut().into_item(name)
    }

    pub fn get_str(&self, name: &str) -> ModelResult<&str> {
        self.view().get_str(name)
    }

    pub fn get_i64(&self, name: &str) -> ModelResult<i64> {
        self.view().get_i64(name)
    }

    pub fn get_f64(&self, name: &str) -> ModelResult<f64> {
        self.view().get_f64(name)
    }

    pub fn get_bool(&self, name: &str) -> ModelResult<bool> {
        self.view().get_bool(name)
    }

    pub fn get_bytes(&self, name: &str) -> ModelResult<Vec<u8>> {
        self.view().get_bytes(name)
    }

    pub fn get_timestamp(&self, name: &str) -> ModelResult<DateTime<Utc>> {
        self.view().get_timestamp(name)
    }

    pub fn get_uuid(&self, name: &str) -> ModelResult<Uuid> {
        self.view().get_uuid(name)
    }

    pub fn get_member(&self, name: &str) -> ModelResult<&EnumMember> {
        self.view().get_member(name)
    }

    pub fn record(&self, name: &str) -> ModelResult<RecordRef<'_>> {
        self.view().record(name)
    }

    pub fn list(&self, name: &str) -> ModelResult<ListRef<'_>> {
        self.view().list(name)
    }

    pub fn mapping(&self, name: &str) -> ModelResult<MappingRef<'_>> {
        self.view().mapping(name)
    }

    pub fn record_mut(&mut self, name: &str) -> ModelResult<RecordMut<'_>> {
        self.view_mut().into_record_mut(name)
    }

    pub fn list_mut(&mut self, name: &str) -> ModelResult<ListMut<'_>> {
        self.view_mut().into_list_mut(name)
    }

    pub fn mapping_mut(&mut self, name: &str) -> ModelResult<MappingMut<'_>> {
        self.view_mut().into_mapping_mut(name)
    }
}

/// Records are equal when they share a model and hold equal documents.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model, &other.model) && self.data == other.data
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.data)
    }
}
