//! Schema compiler
//!
//! `ModelBuilder` collects field declarations, model options and constants,
//! validates them, and compiles them into a `Model`:
//! - model options are attached beneath every field's own options
//! - fields are ordered for construction: compounds, containers, scalars
//! - the flattened registry is built by walking every field
//!
//! Declarations are immutable once built.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;

use super::compiled::{FieldSlot, Model};
use crate::errors::{ModelError, ModelResult};
use crate::field::{Field, Options};
use crate::observability::{log_event_with_fields, Event};

/// Builder for a `Model`
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    name: String,
    doc: Option<String>,
    options: Options,
    fields: Vec<(String, Field)>,
    constants: Vec<(String, Value)>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets a model-level option, visible through every field's `get`
    /// unless the field sets the same key.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Declares a field. Declaration order is preserved.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Attaches a constant to the model. Constants are not fields: they
    /// are never cast and never appear in documents.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.push((name.into(), value.into()));
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Validates the declarations and compiles the model.
    pub fn build(self) -> ModelResult<Arc<Model>> {
        if self.name.trim().is_empty() {
            return Err(ModelError::invalid_declaration(
                self.name,
                "model name must not be empty",
            ));
        }

        let options = Arc::new(self.options);
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());
        for (name, field) in self.fields {
            validate_name(&self.name, &name)?;
            if index.insert(name.clone(), fields.len()).is_some() {
                return Err(ModelError::invalid_declaration(
                    &self.name,
                    format!("field '{}' declared twice", name),
                ));
            }
            fields.push(FieldSlot::new(name, field.with_model_defaults(Arc::clone(&options))));
        }

        let mut constants = BTreeMap::new();
        for (name, value) in self.constants {
            validate_name(&self.name, &name)?;
            if index.contains_key(&name) {
                return Err(ModelError::invalid_declaration(
                    &self.name,
                    format!("constant '{}' clashes with a field", name),
                ));
            }
            if constants.insert(name.clone(), value).is_some() {
                return Err(ModelError::invalid_declaration(
                    &self.name,
                    format!("constant '{}' declared twice", name),
                ));
            }
        }

        // Stable sort keeps declaration order within each shape
        let mut resolution: Vec<usize> = (0..fields.len()).collect();
        resolution.sort_by_key(|position| fields[*position].shape());

        let mut flat = BTreeMap::new();
        for slot in &fields {
            flat.extend(slot.field().flatten(slot.name()));
        }

        let model = Model {
            name: self.name,
            doc: self.doc,
            options,
            fields,
            index,
            resolution,
            flat,
            constants,
        };

        let field_count = model.fields.len().to_string();
        let flat_count = model.flat.len().to_string();
        log_event_with_fields(
            Event::ModelCompiled,
            &[
                ("model", model.name.as_str()),
                ("fields", field_count.as_str()),
                ("flat_fields", flat_count.as_str()),
            ],
        );

        Ok(Arc::new(model))
    }
}

/// Field and constant names must be usable as a single path segment.
fn validate_name(model: &str, name: &str) -> ModelResult<()> {
    if name.is_empty() {
        return Err(ModelError::invalid_declaration(
            model,
            "field name must not be empty",
        ));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '.' | '[' | ']')) {
        return Err(ModelError::invalid_declaration(
            model,
            format!("name '{}' must not contain '{}'", name, c),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Shape;
    use serde_json::json;

    #[test]
    fn test_resolution_order_by_shape() {
        let inner = ModelBuilder::new("Inner")
            .field("x", Field::integer())
            .build()
            .unwrap();
        let model = ModelBuilder::new("Outer")
            .field("a", Field::string())
            .field("b", Field::list(Field::integer()))
            .field("c", Field::compound(inner))
            .field("d", Field::integer())
            .field("e", Field::mapping(Field::integer()))
            .build()
            .unwrap();

        let order: Vec<&str> = model.resolution_order().map(FieldSlot::name).collect();
        assert_eq!(order, vec!["c", "b", "e", "a", "d"]);
        let names: Vec<&str> = model.field_names().collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(model.slot("c").unwrap().shape(), Shape::Compound);
    }

    #[test]
    fn test_declaration_errors() {
        let cases = vec![
            ModelBuilder::new(""),
            ModelBuilder::new("M").field("", Field::integer()),
            ModelBuilder::new("M").field("a.b", Field::integer()),
            ModelBuilder::new("M").field("a[]", Field::integer()),
            ModelBuilder::new("M")
                .field("a", Field::integer())
                .field("a", Field::string()),
            ModelBuilder::new("M")
                .field("a", Field::integer())
                .constant("a", 1),
            ModelBuilder::new("M").constant("k", 1).constant("k", 2),
        ];
        for builder in cases {
            let err = builder.build().unwrap_err();
            assert_eq!(err.code(), "DRAUGHTS_INVALID_DECLARATION");
        }
    }

    #[test]
    fn test_model_options_apply_beneath_fields() {
        let model = ModelBuilder::new("M")
            .option("index", true)
            .field("a", Field::integer())
            .field("b", Field::integer().with("index", false))
            .build()
            .unwrap();
        assert_eq!(model.field("a").unwrap().get("index"), Some(&json!(true)));
        assert_eq!(model.field("b").unwrap().get("index"), Some(&json!(false)));
        assert_eq!(model.option("index"), Some(&json!(true)));
    }

    #[test]
    fn test_model_options_never_supply_defaults() {
        let model = ModelBuilder::new("M")
            .option("default", 5)
            .field("a", Field::integer())
            .build()
            .unwrap();
        assert!(model.field("a").unwrap().default_value().is_none());
    }

    #[test]
    fn test_constants_and_doc() {
        let model = ModelBuilder::new("Search")
            .doc("Search settings")
            .constant("VERSION", 3)
            .field("engine", Field::keyword())
            .build()
            .unwrap();
        assert_eq!(model.constant("VERSION"), Some(&json!(3)));
        assert!(!model.contains("VERSION"));
        assert_eq!(model.doc(), Some("Search settings"));
    }

    #[test]
    fn test_flat_registry() {
        let inner = ModelBuilder::new("InnerA")
            .field("number", Field::integer().default(10))
            .build()
            .unwrap();
        let model = ModelBuilder::new("Outer")
            .field("a", Field::compound(inner))
            .field("counts", Field::mapping(Field::integer()))
            .field("name", Field::string())
            .build()
            .unwrap();
        let paths: Vec<&str> = model.flat_fields().keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["a.number", "counts.*.", "name"]);
    }
}
