//! draughts - typed, validated views over plain JSON documents
//!
//! A model is a closed set of typed field declarations. Constructing a
//! record of a model casts every field into its canonical JSON form; the
//! record keeps that document as its only state, and every later write is
//! cast before it lands in the document.
//!
//! ```ignore
//! use draughts::{Field, ModelBuilder};
//! use serde_json::json;
//!
//! let model = ModelBuilder::new("Test")
//!     .field("first", Field::string())
//!     .field("second", Field::integer())
//!     .build()?;
//! let mut record = model.load(json!({"first": "a", "second": "12"}))?;
//! record.set("second", 13)?;
//! assert_eq!(draughts::dumps(&record)?, r#"{"first":"a","second":13}"#);
//! ```

pub mod cli;
pub mod errors;
pub mod field;
pub mod loader;
pub mod model;
pub mod observability;
pub mod proxy;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use errors::{ModelError, ModelResult};
pub use field::{EnumMember, Field, FieldKind, Options, Shape};
pub use loader::ModelLoader;
pub use model::{FieldSlot, Model, ModelBuilder, Record, Schema};

/// The raw, JSON-safe storage behind one record
pub type Document = serde_json::Map<String, serde_json::Value>;

/// The canonical document of a record.
pub fn raw(record: &Record) -> &Document {
    record.raw()
}

/// Compact JSON text of a record's canonical document.
pub fn dumps(record: &Record) -> ModelResult<String> {
    record.dumps()
}

/// Declared fields of a model, in declaration order.
pub fn fields(model: &Model) -> &[FieldSlot] {
    model.fields()
}

/// Every leaf of a model keyed by dotted path.
pub fn flat_fields(model: &Model) -> &BTreeMap<String, Arc<Field>> {
    model.flat_fields()
}
