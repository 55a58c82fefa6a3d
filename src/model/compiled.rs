//! Compiled model
//!
//! A `Model` is the immutable output of `ModelBuilder::build`. It owns the
//! field registry, the flattened registry of nested paths and the model
//! constants. Records hold an `Arc<Model>`, so a model lives as long as
//! any record built from it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::field::{Field, Options, Shape};

/// One declared field
#[derive(Debug, Clone)]
pub struct FieldSlot {
    name: String,
    field: Field,
}

impl FieldSlot {
    pub(crate) fn new(name: String, field: Field) -> Self {
        Self { name, field }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn shape(&self) -> Shape {
        self.field.shape()
    }
}

/// A compiled record type
pub struct Model {
    pub(crate) name: String,
    pub(crate) doc: Option<String>,
    pub(crate) options: Arc<Options>,
    /// Declared fields, in declaration order
    pub(crate) fields: Vec<FieldSlot>,
    /// Field name to position in `fields`
    pub(crate) index: HashMap<String, usize>,
    /// Positions in construction order: compounds, containers, scalars
    pub(crate) resolution: Vec<usize>,
    pub(crate) flat: BTreeMap<String, Arc<Field>>,
    pub(crate) constants: BTreeMap<String, Value>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Model-level options applied beneath every field's own options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.slot(name).map(FieldSlot::field)
    }

    pub fn slot(&self, name: &str) -> Option<&FieldSlot> {
        self.index.get(name).map(|position| &self.fields[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSlot::name)
    }

    /// Fields in the order construction resolves them.
    pub fn resolution_order(&self) -> impl Iterator<Item = &FieldSlot> {
        self.resolution.iter().map(move |position| &self.fields[*position])
    }

    /// Every leaf reachable from this model, keyed by dotted path.
    pub fn flat_fields(&self) -> &BTreeMap<String, Arc<Field>> {
        &self.flat
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    pub fn constants(&self) -> &BTreeMap<String, Value> {
        &self.constants
    }

    /// JSON description of the declared fields, keyed by name.
    pub fn describe(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|slot| (slot.name.clone(), slot.field.describe()))
            .collect();
        Value::Object(fields)
    }

    /// JSON description of the flattened registry.
    pub fn describe_flat(&self) -> Value {
        let fields: Map<String, Value> = self
            .flat
            .iter()
            .map(|(path, field)| (path.clone(), field.describe()))
            .collect();
        Value::Object(fields)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("constants", &self.constants)
            .finish()
    }
}
