//! Model declaration files
//!
//! One JSON object per model:
//!
//! ```json
//! {
//!   "name": "Entry",
//!   "options": {"index": true},
//!   "fields": [
//!     {"name": "key", "type": "keyword"},
//!     {"name": "value", "type": "int", "options": {"default": 0}},
//!     {"name": "tags", "type": "list", "element": {"type": "string"}},
//!     {"name": "id", "type": "uuid", "factory": "uuid4"}
//!   ],
//!   "constants": {"VERSION": 1}
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ModelError, ModelResult};
use crate::field::{factory, Factory, Field, Options};
use crate::model::{Model, ModelBuilder};

/// A model declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Model-level options
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: Options,
    pub fields: Vec<FieldDecl>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constants: BTreeMap<String, Value>,
}

/// A named field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(flatten)]
    pub kind: KindDecl,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: Options,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<FactoryName>,
}

/// An unnamed field declaration, used for wrapped and element fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpecDecl {
    #[serde(flatten)]
    pub kind: KindDecl,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: Options,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<FactoryName>,
}

/// Field type, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindDecl {
    Any,
    Bool,
    Int,
    Float,
    String,
    Keyword,
    Text,
    Json,
    Uuid,
    Bytes,
    Timestamp,
    Enum { members: Vec<EnumMemberDecl> },
    Optional { field: Box<FieldSpecDecl> },
    List { element: Box<FieldSpecDecl> },
    Mapping { element: Box<FieldSpecDecl> },
    /// Reference to another model by name
    Compound { model: String },
}

/// Enum member: a bare value named after itself, or a name/value pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumMemberDecl {
    Named { name: String, value: Value },
    Value(String),
}

/// Factories that can be named in a declaration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryName {
    Uuid4,
    Now,
    EmptyList,
    EmptyMapping,
}

impl FactoryName {
    pub fn factory(self) -> Factory {
        match self {
            FactoryName::Uuid4 => Factory::new(factory::uuid4),
            FactoryName::Now => Factory::new(factory::now),
            FactoryName::EmptyList => Factory::new(factory::empty_list),
            FactoryName::EmptyMapping => Factory::new(factory::empty_mapping),
        }
    }
}

impl ModelDecl {
    /// Names of the models this declaration refers to.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for field in &self.fields {
            field.kind.collect_references(&mut names);
        }
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Compiles the declaration. Every referenced model must be present
    /// in `models`.
    pub fn compile(&self, models: &BTreeMap<String, Arc<Model>>) -> ModelResult<Arc<Model>> {
        let mut builder = ModelBuilder::new(&self.name);
        if let Some(doc) = &self.doc {
            builder = builder.doc(doc);
        }
        for (key, value) in &self.options {
            builder = builder.option(key, value.clone());
        }
        for field in &self.fields {
            let compiled = build_field(
                &self.name,
                &field.kind,
                &field.options,
                field.factory,
                models,
            )?;
            builder = builder.field(&field.name, compiled);
        }
        for (name, value) in &self.constants {
            builder = builder.constant(name, value.clone());
        }
        builder.build()
    }
}

impl KindDecl {
    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            KindDecl::Compound { model } => names.push(model),
            KindDecl::Optional { field: inner }
            | KindDecl::List { element: inner }
            | KindDecl::Mapping { element: inner } => inner.kind.collect_references(names),
            _ => {}
        }
    }
}

fn build_spec(
    model: &str,
    spec: &FieldSpecDecl,
    models: &BTreeMap<String, Arc<Model>>,
) -> ModelResult<Field> {
    build_field(model, &spec.kind, &spec.options, spec.factory, models)
}

fn build_field(
    model: &str,
    kind: &KindDecl,
    options: &Options,
    factory: Option<FactoryName>,
    models: &BTreeMap<String, Arc<Model>>,
) -> ModelResult<Field> {
    let field = match kind {
        KindDecl::Any => Field::any(),
        KindDecl::Bool => Field::boolean(),
        KindDecl::Int => Field::integer(),
        KindDecl::Float => Field::float(),
        KindDecl::String => Field::string(),
        KindDecl::Keyword => Field::keyword(),
        KindDecl::Text => Field::text(),
        KindDecl::Json => Field::json(),
        KindDecl::Uuid => Field::uuid(),
        KindDecl::Bytes => Field::bytes(),
        KindDecl::Timestamp => Field::timestamp(),
        KindDecl::Enum { members } => {
            if members.is_empty() {
                return Err(ModelError::invalid_declaration(
                    model,
                    "enum must declare at least one member",
                ));
            }
            Field::enum_members(members.iter().map(|member| match member {
                EnumMemberDecl::Named { name, value } => (name.clone(), value.clone()),
                EnumMemberDecl::Value(value) => (value.clone(), Value::String(value.clone())),
            }))?
        }
        KindDecl::Optional { field } => Field::optional(build_spec(model, field, models)?),
        KindDecl::List { element } => Field::list(build_spec(model, element, models)?),
        KindDecl::Mapping { element } => Field::mapping(build_spec(model, element, models)?),
        KindDecl::Compound { model: reference } => {
            let nested = models.get(reference).ok_or_else(|| {
                ModelError::invalid_declaration(
                    model,
                    format!("unknown model '{}'", reference),
                )
            })?;
            Field::compound(Arc::clone(nested))
        }
    };

    let mut field = options
        .iter()
        .fold(field, |field, (key, value)| field.with(key, value.clone()));
    if let Some(name) = factory {
        field = field.with_factory(Some(name.factory()));
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ModelDecl {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_declaration() {
        let decl = parse(json!({
            "name": "Entry",
            "fields": [
                {"name": "key", "type": "keyword", "options": {"index": true}},
                {"name": "value", "type": "int", "options": {"default": 0}},
                {"name": "engine", "type": "enum", "members": ["magic", {"name": "SOLR", "value": "solr"}]},
                {"name": "tags", "type": "list", "element": {"type": "string"}, "factory": "empty_list"},
                {"name": "note", "type": "optional", "field": {"type": "text"}}
            ]
        }));
        assert_eq!(decl.fields.len(), 5);
        assert_eq!(decl.fields[3].factory, Some(FactoryName::EmptyList));

        let model = decl.compile(&BTreeMap::new()).unwrap();
        let members = model.field("engine").unwrap().members().unwrap();
        assert_eq!(members[1].name(), "SOLR");
        assert_eq!(model.field("key").unwrap().get("index"), Some(&json!(true)));

        let record = model.load(json!({"key": "k", "engine": "SOLR"})).unwrap();
        assert_eq!(
            record.to_value(),
            json!({"key": "k", "value": 0, "engine": "solr", "tags": [], "note": null})
        );
    }

    #[test]
    fn test_references() {
        let decl = parse(json!({
            "name": "Outer",
            "fields": [
                {"name": "a", "type": "compound", "model": "InnerA"},
                {"name": "b", "type": "list", "element": {"type": "compound", "model": "InnerB"}},
                {"name": "c", "type": "compound", "model": "InnerA"}
            ]
        }));
        assert_eq!(decl.references(), vec!["InnerA", "InnerB"]);
        let err = decl.compile(&BTreeMap::new()).unwrap_err();
        assert_eq!(err.code(), "DRAUGHTS_INVALID_DECLARATION");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<ModelDecl, _> = serde_json::from_value(json!({
            "name": "Bad",
            "fields": [{"name": "a", "type": "regex"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_member_values_checked() {
        let decl = parse(json!({
            "name": "Flag",
            "fields": [{"name": "on", "type": "enum", "members": [
                {"name": "YES", "value": true},
                {"name": "NO", "value": false}
            ]}]
        }));
        let err = decl.compile(&BTreeMap::new()).unwrap_err();
        assert_eq!(err.code(), "DRAUGHTS_INVALID_DECLARATION");
        assert!(err.to_string().contains("YES"));
    }
}
