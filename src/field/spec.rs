//! Field declarations
//!
//! A `Field` pairs a semantic type with an open set of options. Options are
//! plain JSON values keyed by name; the engine interprets `default` during
//! construction and stores every other key untouched. A field is created
//! once at declaration time and shared read-only by every record of the
//! model it belongs to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::catalog;
use super::enumeration::{EnumMember, EnumSpec};
use super::factory;
use crate::errors::{ModelError, ModelResult};
use crate::model::Model;
use crate::proxy;

/// Named field options
pub type Options = BTreeMap<String, Value>;

/// Option key holding a field's default value
pub const DEFAULT_OPTION: &str = "default";

/// Zero-argument value producer used when no value or default is available.
#[derive(Clone)]
pub struct Factory(Arc<dyn Fn() -> Value + Send + Sync>);

impl Factory {
    pub fn new(produce: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(produce))
    }

    pub fn produce(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

/// Semantic type of a field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Any JSON value, unchanged
    Any,
    Boolean,
    Integer,
    Float,
    String,
    /// Short symbolic string
    Keyword,
    /// Natural-language string
    Text,
    /// String holding well-formed JSON text
    Json,
    /// String holding an identifier
    Uuid,
    Bytes,
    /// Seconds since the Unix epoch
    Timestamp,
    Enum(Arc<EnumSpec>),
    /// Null, or a value of the wrapped field
    Optional(Box<Field>),
    /// Homogeneous list
    List(Box<Field>),
    /// String-keyed mapping with homogeneous values
    Mapping(Box<Field>),
    /// Sub-record defined by another model
    Compound(Arc<Model>),
}

/// How a field is materialized on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Shape {
    /// Sub-record; resolved first during construction
    Compound,
    /// List or mapping; resolved second
    Container,
    /// Leaf value; resolved last
    Scalar,
}

/// A field declaration
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    /// Options set on this field
    options: Options,
    /// Options passed down from an enclosing field when flattened
    inherited: Options,
    /// Options declared on the owning model
    model_defaults: Arc<Options>,
    factory: Option<Factory>,
}

impl Field {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            options: Options::new(),
            inherited: Options::new(),
            model_defaults: Arc::new(Options::new()),
            factory: None,
        }
    }

    pub fn any() -> Self {
        Self::of(FieldKind::Any)
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub fn float() -> Self {
        Self::of(FieldKind::Float)
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn keyword() -> Self {
        Self::of(FieldKind::Keyword)
    }

    pub fn text() -> Self {
        Self::of(FieldKind::Text)
    }

    pub fn json() -> Self {
        Self::of(FieldKind::Json)
    }

    /// Identifier string. Generates a random v4 identifier when absent.
    pub fn uuid() -> Self {
        Self::of(FieldKind::Uuid).factory(factory::uuid4)
    }

    pub fn bytes() -> Self {
        Self::of(FieldKind::Bytes)
    }

    pub fn timestamp() -> Self {
        Self::of(FieldKind::Timestamp)
    }

    /// Enumeration whose member names are their values.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = values
            .into_iter()
            .map(|value| {
                let value = value.into();
                EnumMember::new(value.clone(), value)
            })
            .collect();
        Self::of(FieldKind::Enum(Arc::new(EnumSpec::new(members))))
    }

    /// Enumeration of named members. Member values must be strings or
    /// numbers.
    pub fn enum_members<I, S, V>(members: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let members = members
            .into_iter()
            .map(|(name, value)| EnumMember::new(name, value))
            .collect();
        let spec = EnumSpec::checked(members)?;
        Ok(Self::of(FieldKind::Enum(Arc::new(spec))))
    }

    /// Allows null; defaults to null.
    pub fn optional(inner: Field) -> Self {
        Self::of(FieldKind::Optional(Box::new(inner))).default(Value::Null)
    }

    pub fn list(element: Field) -> Self {
        Self::of(FieldKind::List(Box::new(element)))
    }

    pub fn mapping(element: Field) -> Self {
        Self::of(FieldKind::Mapping(Box::new(element)))
    }

    pub fn compound(model: Arc<Model>) -> Self {
        Self::of(FieldKind::Compound(model))
    }

    /// Sets an option. Unrecognized keys are stored and never interpreted.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the value used when construction finds none.
    pub fn default(self, value: impl Into<Value>) -> Self {
        self.with(DEFAULT_OPTION, value)
    }

    /// Sets the producer invoked when there is neither a value nor a default.
    pub fn factory(mut self, produce: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.factory = Some(Factory::new(produce));
        self
    }

    pub(crate) fn with_factory(mut self, factory: Option<Factory>) -> Self {
        self.factory = factory;
        self
    }

    pub(crate) fn with_model_defaults(mut self, defaults: Arc<Options>) -> Self {
        self.model_defaults = defaults;
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Looks up an option: this field's own setting, then anything inherited
    /// from an enclosing field, then the owning model's default.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options
            .get(key)
            .or_else(|| self.inherited.get(key))
            .or_else(|| self.model_defaults.get(key))
    }

    /// Options explicitly set on this field.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Every option visible through `get`, merged.
    pub fn effective_options(&self) -> Options {
        let mut merged = (*self.model_defaults).clone();
        merged.extend(self.inherited.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(self.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Explicit default. Model-level options never supply one.
    pub fn default_value(&self) -> Option<&Value> {
        self.options.get(DEFAULT_OPTION)
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Runs the factory, if any.
    pub fn produce(&self) -> Option<Value> {
        self.factory.as_ref().map(Factory::produce)
    }

    pub fn shape(&self) -> Shape {
        match &self.kind {
            FieldKind::Compound(_) => Shape::Compound,
            FieldKind::List(_) | FieldKind::Mapping(_) => Shape::Container,
            FieldKind::Optional(inner) => inner.shape(),
            _ => Shape::Scalar,
        }
    }

    /// The field with any `Optional` wrappers removed.
    pub fn unwrapped(&self) -> &Field {
        match &self.kind {
            FieldKind::Optional(inner) => inner.unwrapped(),
            _ => self,
        }
    }

    /// Element field of a list or mapping.
    pub fn element(&self) -> Option<&Field> {
        match &self.kind {
            FieldKind::List(element) | FieldKind::Mapping(element) => Some(element),
            _ => None,
        }
    }

    /// Nested model of a compound.
    pub fn model(&self) -> Option<&Arc<Model>> {
        match &self.kind {
            FieldKind::Compound(model) => Some(model),
            _ => None,
        }
    }

    /// Members of an enumeration.
    pub fn members(&self) -> Option<&[EnumMember]> {
        match &self.kind {
            FieldKind::Enum(spec) => Some(spec.members()),
            _ => None,
        }
    }

    pub(crate) fn enum_spec(&self) -> Option<&EnumSpec> {
        match &self.kind {
            FieldKind::Enum(spec) => Some(spec),
            _ => None,
        }
    }

    /// Type name for error messages and introspection
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            FieldKind::Any => "any",
            FieldKind::Boolean => "bool",
            FieldKind::Integer => "int",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Keyword => "keyword",
            FieldKind::Text => "text",
            FieldKind::Json => "json",
            FieldKind::Uuid => "uuid",
            FieldKind::Bytes => "bytes",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum(_) => "enum",
            FieldKind::Optional(_) => "optional",
            FieldKind::List(_) => "list",
            FieldKind::Mapping(_) => "mapping",
            FieldKind::Compound(_) => "compound",
        }
    }

    /// Converts `value` into this field's canonical raw form.
    ///
    /// Compound values run the nested model's construction protocol, and
    /// containers cast every element, so the result is always a complete,
    /// JSON-safe document fragment.
    pub fn cast(&self, value: Value) -> ModelResult<Value> {
        match &self.kind {
            FieldKind::Any => Ok(value),
            FieldKind::Boolean => catalog::cast_boolean(value),
            FieldKind::Integer => catalog::cast_integer(value),
            FieldKind::Float => catalog::cast_float(value),
            FieldKind::String | FieldKind::Keyword | FieldKind::Text | FieldKind::Uuid => {
                catalog::cast_string(value)
            }
            FieldKind::Json => catalog::cast_json_text(value),
            FieldKind::Bytes => catalog::cast_bytes(value),
            FieldKind::Timestamp => catalog::cast_timestamp(value),
            FieldKind::Enum(spec) => spec.lookup(&value).map(|member| member.value().clone()),
            FieldKind::Optional(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.cast(value)
                }
            }
            FieldKind::List(element) => proxy::cast_list(element, value),
            FieldKind::Mapping(element) => proxy::cast_mapping(element, value),
            FieldKind::Compound(model) => match value {
                Value::Object(document) => model.resolve(document, Map::new()).map(Value::Object),
                other => Err(ModelError::type_mismatch(model.name(), &other)),
            },
        }
    }

    /// Flattens this field into dotted paths of leaf fields.
    ///
    /// Compounds contribute `prefix.name` for every nested path, lists
    /// append `[]`, mappings append `.*.`. Leaves reached through a
    /// container or compound inherit the options set along the way.
    pub fn flatten(&self, prefix: &str) -> BTreeMap<String, Arc<Field>> {
        let nested = match &self.kind {
            FieldKind::Compound(model) => model
                .flat_fields()
                .iter()
                .map(|(path, field)| (flat_path(prefix, path), field.as_ref().clone()))
                .collect::<Vec<_>>(),
            FieldKind::List(element) => flatten_owned(element, &format!("{}[]", prefix)),
            FieldKind::Mapping(element) => flatten_owned(element, &flat_path(prefix, "*.")),
            FieldKind::Optional(inner) if inner.shape() != Shape::Scalar => {
                flatten_owned(inner, prefix)
            }
            _ => {
                let mut single = BTreeMap::new();
                single.insert(prefix.to_string(), Arc::new(self.clone()));
                return single;
            }
        };
        nested
            .into_iter()
            .map(|(path, field)| (path, Arc::new(field.inherit_from(self))))
            .collect()
    }

    /// Copies this field with `parent`'s visible options layered beneath
    /// its own. Defaults and factories never pass down.
    fn inherit_from(mut self, parent: &Field) -> Field {
        let mut passed = parent.effective_options();
        passed.remove(DEFAULT_OPTION);
        for (key, value) in std::mem::take(&mut self.inherited) {
            passed.insert(key, value);
        }
        self.inherited = passed;
        self
    }

    /// JSON description used for introspection output.
    pub fn describe(&self) -> Value {
        let mut description = Map::new();
        description.insert("type".into(), json!(self.type_name()));
        let options = self.effective_options();
        if !options.is_empty() {
            description.insert("options".into(), json!(options));
        }
        if self.factory.is_some() {
            description.insert("factory".into(), json!(true));
        }
        match &self.kind {
            FieldKind::Enum(spec) => {
                let members: Vec<Value> = spec
                    .members()
                    .iter()
                    .map(|m| json!({ "name": m.name(), "value": m.value() }))
                    .collect();
                description.insert("members".into(), Value::Array(members));
            }
            FieldKind::Optional(inner) => {
                description.insert("field".into(), inner.describe());
            }
            FieldKind::List(element) | FieldKind::Mapping(element) => {
                description.insert("element".into(), element.describe());
            }
            FieldKind::Compound(model) => {
                description.insert("model".into(), json!(model.name()));
            }
            _ => {}
        }
        Value::Object(description)
    }
}

/// Appends `segment`, unless `prefix` already ends in the `.*.` separator.
fn flat_path(prefix: &str, segment: &str) -> String {
    if prefix.ends_with('.') {
        format!("{}{}", prefix, segment)
    } else {
        format!("{}.{}", prefix, segment)
    }
}

fn flatten_owned(field: &Field, prefix: &str) -> Vec<(String, Field)> {
    field
        .flatten(prefix)
        .into_iter()
        .map(|(path, field)| (path, Arc::try_unwrap(field).unwrap_or_else(|f| (*f).clone())))
        .collect()
}
