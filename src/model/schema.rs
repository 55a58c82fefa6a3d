//! Typed wrappers over records
//!
//! A type implementing `Schema` binds itself to one compiled model and
//! wraps a `Record` of it. Behaviour is added as ordinary methods on the
//! wrapper; the record stays the single owner of the document.
//!
//! ```ignore
//! struct Cat(Record);
//!
//! impl Schema for Cat {
//!     fn model() -> &'static Arc<Model> {
//!         static MODEL: OnceLock<Arc<Model>> = OnceLock::new();
//!         MODEL.get_or_init(|| {
//!             ModelBuilder::new("Cat")
//!                 .field("name", Field::string())
//!                 .build()
//!                 .expect("Cat declaration")
//!         })
//!     }
//!     fn from_record(record: Record) -> Self { Cat(record) }
//!     fn record(&self) -> &Record { &self.0 }
//!     fn record_mut(&mut self) -> &mut Record { &mut self.0 }
//! }
//! ```

use std::sync::Arc;

use serde_json::Value;

use super::compiled::Model;
use super::record::Record;
use crate::errors::ModelResult;
use crate::Document;

/// A wrapper type bound to a model compiled once per process
pub trait Schema: Sized {
    /// The model every instance is built from.
    fn model() -> &'static Arc<Model>;

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn construct(document: Option<Value>, named: Document) -> ModelResult<Self> {
        Self::model().construct(document, named).map(Self::from_record)
    }

    fn load(document: Value) -> ModelResult<Self> {
        Self::model().load(document).map(Self::from_record)
    }

    fn from_fields<I, K, V>(values: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::model().from_fields(values).map(Self::from_record)
    }

    fn raw(&self) -> &Document {
        self.record().raw()
    }

    fn dumps(&self) -> ModelResult<String> {
        self.record().dumps()
    }
}
