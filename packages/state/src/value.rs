//! The Value type - a tree-shaped data structure.
//!
//! Every committed state tree is a `Value`. Maps are the internal nodes that
//! patches merge into; every other variant is a leaf, including arrays.

use std::collections::BTreeMap;

use crate::Path;

/// A node of the state tree.
///
/// # Design Notes
///
/// - Uses `BTreeMap` for deterministic ordering (comparison, debug output)
/// - There is no delete variant; deletion only exists in [`crate::Fragment`],
///   so a committed tree cannot hold a delete marker
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absence of a value. Distinct from "path doesn't exist".
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Opaque binary data.
    Bytes(Vec<u8>),
    /// Ordered sequence of values. A leaf as far as merging is concerned.
    Array(Vec<Value>),
    /// Key-value map with string keys.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get a reference to a nested value by path.
    ///
    /// Only maps are traversed. Returns `None` if any key is missing or a
    /// non-map value sits on the way.
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Map(map) => map.get(component)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn world() -> Value {
        Value::from_iter([(
            "world",
            Value::from_iter([(
                "items",
                Value::from_iter([("i1", Value::from_iter([("name", "Ore")]))]),
            )]),
        )])
    }

    #[test]
    fn get_nested_value() {
        let tree = world();
        assert_eq!(
            tree.get(&path!("world/items/i1/name")),
            Some(&Value::from("Ore"))
        );
        assert!(tree.get(&path!("world/items")).unwrap().is_map());
        assert_eq!(tree.get(&path!("world/recipes")), None);
    }

    #[test]
    fn get_root() {
        let tree = world();
        assert_eq!(tree.get(&path!()), Some(&tree));
    }

    #[test]
    fn get_does_not_traverse_leaves() {
        let tree = Value::from_iter([("list", Value::from(vec![Value::from(1)]))]);
        assert_eq!(tree.get(&path!("list/0")), None);
        let tree = Value::from_iter([("name", "Ore")]);
        assert_eq!(tree.get(&path!("name/len")), None);
    }

    #[test]
    fn get_reaches_any_key() {
        let tree = Value::from_iter([(
            "items",
            Value::from_iter([("ore/plate", Value::from(1)), ("", Value::from(2))]),
        )]);
        assert_eq!(
            tree.get(&path!("items", "ore/plate")),
            Some(&Value::from(1))
        );
        assert_eq!(tree.get(&path!("items", "")), Some(&Value::from(2)));
        assert_eq!(tree.get(&path!("items/ore/plate")), None);
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(3).as_i64(), Some(3));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("x").as_i64(), None);
        assert!(Value::Null.is_null());
        assert!(Value::map().as_map().unwrap().is_empty());
    }
}
