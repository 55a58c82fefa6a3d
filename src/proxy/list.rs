//! List views
//!
//! A list slot is always a JSON array whose items are the canonical raw
//! forms of the element field. Reads hand out `Item`s, which expose nested
//! records and containers as views over the same items. Writes cast first
//! and commit second; batch writes cast the whole batch before touching
//! the array, so a failure partway through changes nothing.

use std::ops::{Bound, Range, RangeBounds};

use serde_json::Value;

use super::item::{Item, ItemMut};
use crate::errors::{ModelError, ModelResult};
use crate::field::Field;

/// Casts a whole value into a list of `element`.
pub fn cast_list(element: &Field, value: Value) -> ModelResult<Value> {
    match value {
        Value::Array(items) => cast_batch(element, items, 0).map(Value::Array),
        other => Err(ModelError::type_mismatch("list", &other)),
    }
}

/// Casts every value, reporting failures at `offset + position`.
fn cast_batch<I, V>(element: &Field, values: I, offset: usize) -> ModelResult<Vec<Value>>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            element
                .cast(value.into())
                .map_err(|e| e.at_index(offset + position))
        })
        .collect()
}

/// Read-only list view.
#[derive(Debug, Clone, Copy)]
pub struct ListRef<'a> {
    element: &'a Field,
    raw: &'a [Value],
}

impl<'a> ListRef<'a> {
    pub(crate) fn new(element: &'a Field, raw: &'a [Value]) -> Self {
        Self { element, raw }
    }

    pub fn element(&self) -> &'a Field {
        self.element
    }

    pub fn raw(&self) -> &'a [Value] {
        self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Item<'a>> {
        self.raw.get(index).map(|raw| Item::new(self.element, raw))
    }

    pub fn iter(&self) -> impl Iterator<Item = Item<'a>> + 'a {
        let element = self.element;
        self.raw.iter().map(move |raw| Item::new(element, raw))
    }
}

/// Mutable list view.
#[derive(Debug)]
pub struct ListMut<'a> {
    element: &'a Field,
    raw: &'a mut Vec<Value>,
}

impl<'a> ListMut<'a> {
    pub(crate) fn new(element: &'a Field, raw: &'a mut Vec<Value>) -> Self {
        Self { element, raw }
    }

    pub fn view(&self) -> ListRef<'_> {
        ListRef::new(self.element, self.raw.as_slice())
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Item<'_>> {
        self.raw.get(index).map(|raw| Item::new(self.element, raw))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<ItemMut<'_>> {
        let element = self.element;
        self.raw.get_mut(index).map(|raw| ItemMut::new(element, raw))
    }

    /// Appends one value.
    pub fn push(&mut self, value: impl Into<Value>) -> ModelResult<()> {
        let position = self.raw.len();
        let value = self
            .element
            .cast(value.into())
            .map_err(|e| e.at_index(position))?;
        self.raw.push(value);
        Ok(())
    }

    /// Appends every value, or none of them.
    ///
    /// This is also the in-place concatenation operation.
    pub fn extend<I, V>(&mut self, values: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let cast = cast_batch(self.element, values, self.raw.len())?;
        self.raw.extend(cast);
        Ok(())
    }

    /// Inserts before `index`; positions past the end append.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> ModelResult<()> {
        let index = index.min(self.raw.len());
        let value = self
            .element
            .cast(value.into())
            .map_err(|e| e.at_index(index))?;
        self.raw.insert(index, value);
        Ok(())
    }

    /// Replaces the value at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> ModelResult<()> {
        let len = self.raw.len();
        if index >= len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
        self.raw[index] = self
            .element
            .cast(value.into())
            .map_err(|e| e.at_index(index))?;
        Ok(())
    }

    /// Slice assignment: replaces `range` with `values`, which may differ
    /// in length. Nothing is written unless every value casts.
    pub fn set_range<R, I, V>(&mut self, range: R, values: I) -> ModelResult<()>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let range = resolve_range(&range, self.raw.len())?;
        let cast = cast_batch(self.element, values, range.start)?;
        self.raw.splice(range, cast);
        Ok(())
    }

    /// Replaces the whole list.
    pub fn replace(&mut self, values: impl IntoIterator<Item = Value>) -> ModelResult<()> {
        let cast = cast_batch(self.element, values, 0)?;
        *self.raw = cast;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.raw.pop()
    }

    pub fn remove(&mut self, index: usize) -> ModelResult<Value> {
        let len = self.raw.len();
        if index >= len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
        Ok(self.raw.remove(index))
    }

    pub fn truncate(&mut self, len: usize) {
        self.raw.truncate(len);
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

/// Converts range bounds into a checked `start..end` over `len` items.
fn resolve_range<R: RangeBounds<usize>>(range: &R, len: usize) -> ModelResult<Range<usize>> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if end > len {
        return Err(ModelError::IndexOutOfBounds { index: end, len });
    }
    if start > end {
        return Err(ModelError::IndexOutOfBounds { index: start, len: end });
    }
    Ok(start..end)
}
