//! Construction protocol
//!
//! 1. The positional value must be an object
//! 2. Document keys outside the declared set are rejected up front
//! 3. Fields resolve compounds first, then containers, then scalars. Each
//!    takes the first source present: named value, document value,
//!    explicit default, factory
//! 4. The resolved value is cast and written under the field's key
//! 5. Named values left over after resolution are rejected
//!
//! A failed construction returns no record.

use std::sync::Arc;

use serde_json::Value;

use super::compiled::Model;
use super::record::Record;
use crate::errors::{json_type_name, ModelError, ModelResult};
use crate::observability::{log_event_with_fields, Event};
use crate::Document;

impl Model {
    /// Builds a record from an optional positional document and named
    /// values. The document is moved into the record.
    pub fn construct(
        self: &Arc<Self>,
        document: Option<Value>,
        named: Document,
    ) -> ModelResult<Record> {
        let document = match document {
            None => Document::new(),
            Some(Value::Object(document)) => document,
            Some(other) => {
                return Err(self.rejected(ModelError::ConstructionType {
                    model: self.name.clone(),
                    found: json_type_name(&other),
                }))
            }
        };

        match self.resolve(document, named) {
            Ok(data) => {
                log_event_with_fields(Event::RecordConstructed, &[("model", self.name.as_str())]);
                Ok(Record::from_parts(Arc::clone(self), data))
            }
            Err(e) => Err(self.rejected(e)),
        }
    }

    /// Builds a record from a document alone.
    pub fn load(self: &Arc<Self>, document: Value) -> ModelResult<Record> {
        self.construct(Some(document), Document::new())
    }

    /// Builds a record from named values alone.
    pub fn from_fields<I, K, V>(self: &Arc<Self>, values: I) -> ModelResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let named = values
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.construct(None, named)
    }

    /// Runs steps 2 to 5 and returns the canonical document.
    ///
    /// Also used to cast compound values, so nested records follow the same
    /// protocol as top-level ones.
    pub(crate) fn resolve(
        &self,
        mut document: Document,
        mut named: Document,
    ) -> ModelResult<Document> {
        let unexpected: Vec<String> = document
            .keys()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            return Err(ModelError::unexpected_keys(&self.name, unexpected));
        }

        let mut resolved = Document::new();
        for slot in self.resolution_order() {
            let name = slot.name();
            let field = slot.field();
            let source = named
                .remove(name)
                .or_else(|| document.remove(name))
                .or_else(|| field.default_value().cloned())
                .or_else(|| field.produce())
                .ok_or_else(|| ModelError::missing_field(name, &self.name))?;
            let value = field.cast(source).map_err(|e| e.at(name))?;
            resolved.insert(name.to_string(), value);
        }

        if !named.is_empty() {
            return Err(ModelError::unexpected_keys(
                &self.name,
                named.keys().cloned().collect(),
            ));
        }
        Ok(resolved)
    }

    fn rejected(&self, error: ModelError) -> ModelError {
        log_event_with_fields(
            Event::ConstructionRejected,
            &[
                ("code", error.code()),
                ("model", self.name.as_str()),
                ("reason", error.to_string().as_str()),
            ],
        );
        error
    }
}
