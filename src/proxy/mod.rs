//! Proxy layer
//!
//! Typed views over a record's raw document. Views borrow the document
//! instead of copying it, so every read reflects the canonical raw form and
//! every write lands in the raw form before the call returns.
//!
//! Containers come in two flavours that share one type:
//! - leaf-valued lists and mappings hand out plain values through `Item`
//! - compound-valued lists and mappings hand out nested `RecordRef` or
//!   `RecordMut` views over the element documents
//!
//! All writes cast before they commit. A write that fails leaves the
//! document exactly as it was.

mod item;
mod list;
mod mapping;
mod record;

pub use item::{Item, ItemMut};
pub use list::{cast_list, ListMut, ListRef};
pub use mapping::{cast_mapping, MappingMut, MappingRef};
pub use record::{RecordMut, RecordRef};
