//! Container Alignment Tests
//!
//! Tests for list and mapping views over compound elements:
//! - Every raw slot is the canonical form of its element
//! - Batch writes are all-or-nothing
//! - Mapping keys are data and round-trip unchanged
//! - Wrapper types compose behaviour over records
//! - Flattened registries carry inherited options

use std::sync::{Arc, OnceLock};

use draughts::{Field, Model, ModelBuilder, ModelError, Record, Schema};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn entry_model() -> Arc<Model> {
    ModelBuilder::new("Entry")
        .field("key", Field::string())
        .field("value", Field::integer().default(0))
        .build()
        .unwrap()
}

fn holder() -> Arc<Model> {
    let entry = entry_model();
    ModelBuilder::new("Holder")
        .field("values", Field::list(Field::compound(Arc::clone(&entry))).default(json!([])))
        .field("by_name", Field::mapping(Field::compound(entry)).default(json!({})))
        .field("numbers", Field::list(Field::integer()).default(json!([])))
        .build()
        .unwrap()
}

/// Every raw slot loads back unchanged through the element field.
fn assert_aligned(record: &Record, name: &str) {
    let list = record.list(name).unwrap();
    assert_eq!(list.len(), list.raw().len());
    for (position, item) in list.iter().enumerate() {
        let canonical = list.element().cast(item.raw().clone()).unwrap();
        assert_eq!(&canonical, &list.raw()[position]);
    }
}

// =============================================================================
// List Tests
// =============================================================================

/// Appending a mapping casts it into a sub-record at the same index.
#[test]
fn test_append_compound() {
    let model = holder();
    let mut record = model.load(json!({})).unwrap();

    record
        .list_mut("values")
        .unwrap()
        .push(json!({"key": 1}))
        .unwrap();

    assert_eq!(record.raw()["values"], json!([{"key": "1", "value": 0}]));
    let values = record.list("values").unwrap();
    let first = values.get(0).unwrap().as_record().unwrap();
    assert_eq!(first.get_str("key").unwrap(), "1");
    assert_eq!(first.get_i64("value").unwrap(), 0);
    assert_aligned(&record, "values");
}

/// A rejected append leaves the list unchanged.
#[test]
fn test_append_incompatible_scalar() {
    let model = holder();
    let mut record = model.load(json!({"values": [{"key": "a"}]})).unwrap();
    let before = record.raw().clone();

    let err = record.list_mut("values").unwrap().push(5).unwrap_err();
    assert_eq!(err.code(), "DRAUGHTS_TYPE_MISMATCH");
    assert_eq!(err.path(), Some("[1]"));
    assert_eq!(record.raw(), &before);
    assert_aligned(&record, "values");
}

/// A batch with one bad element commits nothing.
#[test]
fn test_extend_is_all_or_nothing() {
    let model = holder();
    let mut record = model.load(json!({"numbers": [0, 100]})).unwrap();

    let err = record
        .list_mut("numbers")
        .unwrap()
        .extend(vec![json!(1), json!("2"), json!("bugs")])
        .unwrap_err();
    assert_eq!(err.path(), Some("[4]"));
    assert_eq!(record.raw()["numbers"], json!([0, 100]));

    record
        .list_mut("numbers")
        .unwrap()
        .extend(vec![json!(1), json!("2")])
        .unwrap();
    assert_eq!(record.raw()["numbers"], json!([0, 100, 1, 2]));
}

/// Slice assignment may change the length, and fails atomically.
#[test]
fn test_set_range() {
    let model = holder();
    let mut record = model.load(json!({"numbers": [1, 2, 3, 4]})).unwrap();

    {
        let mut numbers = record.list_mut("numbers").unwrap();
        numbers.set_range(1..3, vec![json!("9")]).unwrap();
        assert_eq!(numbers.len(), 3);
        assert!(numbers.set_range(0..1, vec![json!(5), json!("red")]).is_err());
    }
    assert_eq!(record.raw()["numbers"], json!([1, 9, 4]));
}

/// A nested construction error in a slice assignment leaves the list untouched.
#[test]
fn test_set_range_compound_all_or_nothing() {
    let model = holder();
    let doc = json!({"values": [{"key": "a"}, {"key": "b", "value": 2}]});
    let mut record = model.load(doc).unwrap();
    let before = record.raw()["values"].clone();

    let err = record
        .list_mut("values")
        .unwrap()
        .set_range(0..1, vec![json!({"key": "x"}), json!({"key": "y", "extra": 1})])
        .unwrap_err();
    assert_eq!(err.code(), "DRAUGHTS_UNEXPECTED_KEY");
    assert_eq!(record.raw()["values"], before);
    assert_aligned(&record, "values");

    record
        .list_mut("values")
        .unwrap()
        .set_range(0..1, vec![json!({"key": "x"}), json!({"key": "y", "value": "7"})])
        .unwrap();
    assert_eq!(
        record.raw()["values"],
        json!([
            {"key": "x", "value": 0},
            {"key": "y", "value": 7},
            {"key": "b", "value": 2}
        ])
    );
    assert_aligned(&record, "values");
}

/// The list operations keep the view and the raw list aligned.
#[test]
fn test_list_operations() {
    let model = holder();
    let mut record = model.load(json!({"numbers": [0, 100]})).unwrap();

    {
        let mut numbers = record.list_mut("numbers").unwrap();
        numbers.replace(vec![json!(0), json!(100), json!(5)]).unwrap();
        assert_eq!(numbers.pop(), Some(json!(5)));
        numbers.push(10).unwrap();
        assert_eq!(numbers.len(), 3);
        assert!(numbers.push("cats").is_err());
        assert!(numbers.replace(vec![json!("red")]).is_err());

        numbers.insert(0, "-1").unwrap();
        numbers.set(1, 7.9).unwrap();
        assert_eq!(numbers.remove(3).unwrap(), json!(10));
        assert!(matches!(
            numbers.remove(10),
            Err(ModelError::IndexOutOfBounds { index: 10, len: 3 })
        ));
    }
    assert_eq!(record.raw()["numbers"], json!([-1, 7, 100]));

    let numbers = record.list("numbers").unwrap();
    let read: Vec<i64> = numbers.iter().filter_map(|item| item.as_i64()).collect();
    assert_eq!(read, vec![-1, 7, 100]);
}

/// A whole-list string is not a list.
#[test]
fn test_list_shape_mismatch() {
    let model = holder();
    assert!(model.load(json!({"numbers": "bugs"})).is_err());
    assert!(model.load(json!({"numbers": ["bugs"]})).is_err());
    assert!(model.load(json!({"numbers": []})).is_ok());
}

/// Writes through a list element reach the raw slot.
#[test]
fn test_write_through_element() {
    let model = holder();
    let mut record = model.load(json!({"values": [{"key": "a"}]})).unwrap();

    {
        let mut values = record.list_mut("values").unwrap();
        let mut first = values.get_mut(0).unwrap().into_record().unwrap();
        first.set("value", "12").unwrap();
        assert!(first.set("value", "twelve").is_err());
    }
    assert_eq!(record.raw()["values"][0], json!({"key": "a", "value": 12}));
    assert_aligned(&record, "values");
}

// =============================================================================
// Mapping Tests
// =============================================================================

/// Inserted values are cast into sub-records.
#[test]
fn test_mapping_insert() {
    let model = holder();
    let mut record = model.load(json!({})).unwrap();

    {
        let mut by_name = record.mapping_mut("by_name").unwrap();
        assert_eq!(by_name.insert("a", json!({"key": "x"})).unwrap(), None);
        let previous = by_name.insert("a", json!({"key": "y", "value": 2})).unwrap();
        assert_eq!(previous, Some(json!({"key": "x", "value": 0})));
    }

    let by_name = record.mapping("by_name").unwrap();
    assert_eq!(by_name.len(), 1);
    let a = by_name.get("a").unwrap().as_record().unwrap();
    assert_eq!(a.get_str("key").unwrap(), "y");
    assert_eq!(a.get_i64("value").unwrap(), 2);
}

/// Keys with dots or no characters at all are stored and dumped as given.
#[test]
fn test_mapping_keys_round_trip() {
    let model = holder();
    let doc = json!({"by_name": {"a.b": {"key": "x"}, "": {"key": "y", "value": 1}}});
    let mut record = model.load(doc).unwrap();

    {
        let mut by_name = record.mapping_mut("by_name").unwrap();
        by_name.insert("example.com", json!({"key": "z"})).unwrap();
        by_name
            .extend(vec![("[]", json!({"key": "w"})), ("x.*.", json!({"key": "v"}))])
            .unwrap();
        assert_eq!(by_name.len(), 5);
    }

    let by_name = record.mapping("by_name").unwrap();
    let dotted = by_name.get("a.b").unwrap().as_record().unwrap();
    assert_eq!(dotted.get_str("key").unwrap(), "x");
    assert_eq!(by_name.get("").unwrap().as_record().unwrap().get_i64("value").unwrap(), 1);

    let reloaded = model.load(record.to_value()).unwrap();
    assert_eq!(reloaded, record);
    let text = record.dumps().unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, record.to_value());
    assert_eq!(model.load(parsed).unwrap().raw(), record.raw());
}

/// A bad value in a batch commits nothing.
#[test]
fn test_mapping_extend_all_or_nothing() {
    let model = holder();
    let mut record = model.load(json!({"by_name": {"a": {"key": "x"}}})).unwrap();

    let err = record
        .mapping_mut("by_name")
        .unwrap()
        .extend(vec![("b", json!({"key": "y"})), ("c", json!(3))])
        .unwrap_err();
    assert_eq!(err.code(), "DRAUGHTS_TYPE_MISMATCH");
    assert_eq!(record.raw()["by_name"], json!({"a": {"key": "x", "value": 0}}));
}

/// get_or_insert only writes when the key is absent.
#[test]
fn test_mapping_get_or_insert() {
    let model = holder();
    let mut record = model.load(json!({"by_name": {"a": {"key": "x"}}})).unwrap();

    {
        let mut by_name = record.mapping_mut("by_name").unwrap();
        let existing = by_name.get_or_insert("a", json!({"key": "ignored"})).unwrap();
        assert_eq!(existing.view().raw()["key"], json!("x"));
        let added = by_name.get_or_insert("b", json!({"key": 2})).unwrap();
        assert_eq!(added.view().raw()["key"], json!("2"));
        assert_eq!(by_name.remove("a"), Some(json!({"key": "x", "value": 0})));
    }

    let keys: Vec<&str> = record.mapping("by_name").unwrap().keys().collect();
    assert_eq!(keys, vec!["b"]);
}

// =============================================================================
// Composition Tests
// =============================================================================

#[derive(Debug)]
enum CatError {
    Cat,
    Model(ModelError),
}

impl From<ModelError> for CatError {
    fn from(e: ModelError) -> Self {
        CatError::Model(e)
    }
}

struct Pet(Record);

impl Schema for Pet {
    fn model() -> &'static Arc<Model> {
        static MODEL: OnceLock<Arc<Model>> = OnceLock::new();
        MODEL.get_or_init(|| {
            ModelBuilder::new("Pet")
                .field("value", Field::string())
                .constant("SOUND", "purr")
                .build()
                .expect("Pet declaration")
        })
    }

    fn from_record(record: Record) -> Self {
        Pet(record)
    }

    fn record(&self) -> &Record {
        &self.0
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.0
    }
}

impl Pet {
    fn first(&self) -> &str {
        self.record().get_str("value").unwrap_or_default()
    }

    fn set_first(&mut self, value: impl Into<Value>) -> Result<(), CatError> {
        let value = self.record().model().field("value").map(|f| f.cast(value.into()));
        let value = match value {
            Some(cast) => cast?,
            None => return Err(CatError::Cat),
        };
        if value.as_str().map_or(false, |s| s.starts_with("cat")) {
            return Err(CatError::Cat);
        }
        self.record_mut().set("value", value)?;
        Ok(())
    }

    fn sound() -> Option<&'static Value> {
        Self::model().constant("SOUND")
    }
}

/// Wrapper methods add behaviour on top of the record's typed writes.
#[test]
fn test_wrapper_setter() {
    let mut pet = Pet::from_fields([("value", "abc")]).unwrap();
    assert_eq!(pet.first(), "abc");

    pet.set_first("xyz").unwrap();
    assert_eq!(pet.first(), "xyz");

    pet.set_first(123).unwrap();
    assert_eq!(pet.first(), "123");

    assert!(matches!(pet.set_first("cats"), Err(CatError::Cat)));
    assert_eq!(pet.first(), "123");
    assert_eq!(pet.dumps().unwrap(), "{\"value\":\"123\"}");
}

/// Constants are shared through the model, not stored in records.
#[test]
fn test_model_constants() {
    let pet = Pet::load(json!({"value": "a"})).unwrap();
    assert_eq!(Pet::sound(), Some(&json!("purr")));
    assert!(!pet.raw().contains_key("SOUND"));
    assert!(matches!(
        Pet::load(json!({"value": "a", "SOUND": "bark"})),
        Err(ModelError::UnexpectedKey { .. })
    ));
}

// =============================================================================
// Introspection Tests
// =============================================================================

/// Model options apply to fields that do not set their own.
#[test]
fn test_index_defaults() {
    let declare = |builder: ModelBuilder| {
        builder
            .field("default", Field::string())
            .field("indexed", Field::string().with("index", true))
            .field("not_indexed", Field::string().with("index", false))
            .build()
            .unwrap()
    };

    let plain = declare(ModelBuilder::new("Test1"));
    assert_eq!(plain.field("default").unwrap().get("index"), None);
    assert_eq!(plain.field("indexed").unwrap().get("index"), Some(&json!(true)));

    let on = declare(ModelBuilder::new("Test2").option("index", true));
    assert_eq!(on.field("default").unwrap().get("index"), Some(&json!(true)));
    assert_eq!(on.field("not_indexed").unwrap().get("index"), Some(&json!(false)));

    let off = declare(ModelBuilder::new("Test3").option("index", false));
    assert_eq!(off.field("default").unwrap().get("index"), Some(&json!(false)));
    assert_eq!(off.field("indexed").unwrap().get("index"), Some(&json!(true)));
}

/// Compound fields pass their options down to nested leaves.
#[test]
fn test_compound_index_defaults() {
    let sub = ModelBuilder::new("SubModel")
        .field("default", Field::string())
        .field("indexed", Field::string().with("index", true))
        .field("not_indexed", Field::string().with("index", false))
        .build()
        .unwrap();
    let model = ModelBuilder::new("Test1")
        .field("default", Field::compound(Arc::clone(&sub)))
        .field("indexed", Field::compound(Arc::clone(&sub)).with("index", true))
        .field("not_indexed", Field::compound(sub).with("index", false))
        .build()
        .unwrap();

    let flat = draughts::flat_fields(&model);
    let index = |path: &str| flat[path].get("index").cloned();
    assert_eq!(index("default.default"), None);
    assert_eq!(index("default.indexed"), Some(json!(true)));
    assert_eq!(index("default.not_indexed"), Some(json!(false)));

    assert_eq!(index("indexed.default"), Some(json!(true)));
    assert_eq!(index("indexed.indexed"), Some(json!(true)));
    assert_eq!(index("indexed.not_indexed"), Some(json!(false)));

    assert_eq!(index("not_indexed.default"), Some(json!(false)));
    assert_eq!(index("not_indexed.indexed"), Some(json!(true)));
    assert_eq!(index("not_indexed.not_indexed"), Some(json!(false)));
}

/// Container hops appear as markers in flattened paths.
#[test]
fn test_flat_paths() {
    let model = holder();
    let paths: Vec<&str> = draughts::flat_fields(&model).keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "by_name.*.key",
            "by_name.*.value",
            "numbers[]",
            "values[].key",
            "values[].value",
        ]
    );
    let names: Vec<&str> = draughts::fields(&model).iter().map(|slot| slot.name()).collect();
    assert_eq!(names, vec!["values", "by_name", "numbers"]);
}
