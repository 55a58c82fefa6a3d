//! Field Catalog
//!
//! Leaf cast rules for the primitive and semantic scalar types, plus the
//! `Field` declaration that carries a type and its options. Container and
//! compound fields delegate their casts to the proxy layer and the model.
//!
//! Supported types:
//! - any, bool, int, float
//! - string, keyword, text, uuid, json (string family)
//! - bytes, timestamp
//! - enum, optional
//! - list, mapping, compound

pub mod catalog;
mod enumeration;
pub mod factory;
mod spec;

pub use enumeration::{EnumMember, EnumSpec};
pub use spec::{Factory, Field, FieldKind, Options, Shape, DEFAULT_OPTION};
