//! Schema compiler and construction protocol
//!
//! - `ModelBuilder` compiles field declarations into a `Model`
//! - `Model::construct` resolves every field and produces a `Record`
//! - `Schema` binds wrapper types to a model compiled once

mod builder;
mod compiled;
mod construct;
mod record;
mod schema;

pub use builder::ModelBuilder;
pub use compiled::{FieldSlot, Model};
pub use record::Record;
pub use schema::Schema;
