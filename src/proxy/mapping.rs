//! Mapping views
//!
//! A mapping slot is a JSON object with arbitrary string keys. Keys are
//! data and are stored as given; values are cast before anything is written.

use serde_json::map::Entry;
use serde_json::Value;

use super::item::{Item, ItemMut};
use crate::errors::{ModelError, ModelResult};
use crate::field::Field;
use crate::Document;

/// Casts a whole value into a mapping of `element`.
pub fn cast_mapping(element: &Field, value: Value) -> ModelResult<Value> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => return Err(ModelError::type_mismatch("mapping", &other)),
    };
    let mut cast = Document::new();
    for (key, value) in entries {
        let value = element.cast(value).map_err(|e| e.at(&key))?;
        cast.insert(key, value);
    }
    Ok(Value::Object(cast))
}

/// Read-only mapping view.
#[derive(Debug, Clone, Copy)]
pub struct MappingRef<'a> {
    element: &'a Field,
    raw: &'a Document,
}

impl<'a> MappingRef<'a> {
    pub(crate) fn new(element: &'a Field, raw: &'a Document) -> Self {
        Self { element, raw }
    }

    pub fn element(&self) -> &'a Field {
        self.element
    }

    pub fn raw(&self) -> &'a Document {
        self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Item<'a>> {
        self.raw.get(key).map(|raw| Item::new(self.element, raw))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.raw.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Item<'a>)> + 'a {
        let element = self.element;
        self.raw
            .iter()
            .map(move |(key, raw)| (key.as_str(), Item::new(element, raw)))
    }
}

/// Mutable mapping view.
#[derive(Debug)]
pub struct MappingMut<'a> {
    element: &'a Field,
    raw: &'a mut Document,
}

impl<'a> MappingMut<'a> {
    pub(crate) fn new(element: &'a Field, raw: &'a mut Document) -> Self {
        Self { element, raw }
    }

    pub fn view(&self) -> MappingRef<'_> {
        MappingRef::new(self.element, &*self.raw)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Item<'_>> {
        self.raw.get(key).map(|raw| Item::new(self.element, raw))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<ItemMut<'_>> {
        let element = self.element;
        self.raw.get_mut(key).map(|raw| ItemMut::new(element, raw))
    }

    /// Casts and stores `value` under `key`, returning the previous raw value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> ModelResult<Option<Value>> {
        let key = key.into();
        let value = self.element.cast(value.into()).map_err(|e| e.at(&key))?;
        Ok(self.raw.insert(key, value))
    }

    /// Stores every entry, or none of them.
    pub fn extend<I, K, V>(&mut self, entries: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut staged = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            let value = self.element.cast(value.into()).map_err(|e| e.at(&key))?;
            staged.push((key, value));
        }
        self.raw.extend(staged);
        Ok(())
    }

    /// Returns the slot under `key`, first storing the cast of `value` if
    /// the key is absent.
    pub fn get_or_insert(
        &mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> ModelResult<ItemMut<'_>> {
        let element = self.element;
        let raw = match self.raw.entry(key) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let value = element.cast(value.into()).map_err(|e| e.at(key))?;
                slot.insert(value)
            }
        };
        Ok(ItemMut::new(element, raw))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.raw.remove(key)
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_cast_mapping() {
        let element = Field::integer();
        assert_eq!(
            cast_mapping(&element, json!({"a": "1", "b": 2})).unwrap(),
            json!({"a": 1, "b": 2})
        );
        assert!(cast_mapping(&element, json!([1])).is_err());

        let err = cast_mapping(&element, json!({"a": "one"})).unwrap_err();
        assert_eq!(err.path(), Some("a"));
    }

    #[test]
    fn test_keys_are_stored_verbatim() {
        let element = Field::integer();
        let doc = json!({"a.b": "1", "": 2, "example.com": 3, "[]": 4});
        assert_eq!(
            cast_mapping(&element, doc).unwrap(),
            json!({"a.b": 1, "": 2, "example.com": 3, "[]": 4})
        );

        let mut raw = Document::new();
        let mut mapping = MappingMut::new(&element, &mut raw);
        mapping.insert("c.d", "5").unwrap();
        mapping.extend(vec![("", json!(6))]).unwrap();
        mapping.get_or_insert("x.*", 7).unwrap();
        assert_eq!(mapping.get("c.d").unwrap().as_i64(), Some(5));
        assert_eq!(raw, as_document(json!({"c.d": 5, "": 6, "x.*": 7})));
    }

    #[test]
    fn test_insert_and_remove() {
        let element = Field::float();
        let mut raw = Document::new();
        let mut mapping = MappingMut::new(&element, &mut raw);
        assert_eq!(mapping.insert("a", 1).unwrap(), None);
        assert_eq!(mapping.insert("a", "2.5").unwrap(), Some(json!(1.0)));
        assert!(mapping.insert("b", "cats").is_err());
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("a").unwrap().as_f64(), Some(2.5));
        assert_eq!(mapping.remove("a"), Some(json!(2.5)));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_extend_is_all_or_nothing() {
        let element = Field::integer();
        let mut raw = as_document(json!({"x": 1}));
        let mut mapping = MappingMut::new(&element, &mut raw);
        assert!(mapping.extend(vec![("y", json!(2)), ("z", json!("zed"))]).is_err());
        assert_eq!(mapping.len(), 1);
        mapping.extend(vec![("y", json!(2)), ("z", json!("3"))]).unwrap();
        assert_eq!(raw, as_document(json!({"x": 1, "y": 2, "z": 3})));
    }

    #[test]
    fn test_get_or_insert_nested() {
        let element = Field::list(Field::integer());
        let mut raw = Document::new();
        let mut mapping = MappingMut::new(&element, &mut raw);
        mapping
            .get_or_insert("evens", json!([]))
            .unwrap()
            .into_list()
            .unwrap()
            .push(2)
            .unwrap();
        mapping
            .get_or_insert("evens", json!([]))
            .unwrap()
            .into_list()
            .unwrap()
            .push("4")
            .unwrap();
        let keys: Vec<&str> = mapping.view().keys().collect();
        assert_eq!(keys, vec!["evens"]);
        assert_eq!(raw, as_document(json!({"evens": [2, 4]})));
    }
}
