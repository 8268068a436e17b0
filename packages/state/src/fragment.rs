//! Patch fragments: partial updates to the state tree.

use std::collections::BTreeMap;

use crate::{Path, Value};

/// A partial update shaped like (a subset of) the state tree.
///
/// - `Map` entries are merged key by key into the existing tree.
/// - `Set` replaces whatever is at its position, unless it holds a
///   `Value::Map`, in which case it merges exactly like `Map`.
/// - `Delete` removes the key it sits under.
///
/// `Fragment::from(Value)` turns nested maps into `Map` nodes, so fragments
/// built from values are always in normalized form.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    Map(BTreeMap<String, Fragment>),
    Set(Value),
    Delete,
}

/// The delete marker, for building deletion fragments.
///
/// ```rust
/// use factor_state::{path, Fragment, Store, Value, TOMBSTONE};
///
/// let store = Store::with_state(Value::from_iter([("a", 1), ("b", 2)]));
/// store.patch(Fragment::map().with("a", TOMBSTONE)).unwrap();
/// assert_eq!(store.get_in(&path!("a")), None);
/// ```
pub const TOMBSTONE: Fragment = Fragment::Delete;

impl Fragment {
    /// An empty map fragment. Merging it changes nothing.
    pub fn map() -> Self {
        Fragment::Map(BTreeMap::new())
    }

    /// A fragment setting a value (maps are merged, everything else replaces).
    pub fn set(value: impl Into<Value>) -> Self {
        Fragment::from(value.into())
    }

    /// Builder: add an entry to a map fragment.
    ///
    /// A non-map fragment is discarded and replaced by a map holding only
    /// the new entry.
    #[must_use]
    pub fn with(self, key: impl Into<String>, entry: impl Into<Fragment>) -> Self {
        let mut entries = match self.normalized() {
            Fragment::Map(entries) => entries,
            _ => BTreeMap::new(),
        };
        entries.insert(key.into(), entry.into());
        Fragment::Map(entries)
    }

    /// Build the minimal fragment that sets exactly `path` to `entry`.
    ///
    /// Single-key maps are nested from the leaf outward. The empty path
    /// addresses the root, so the entry itself is returned.
    pub fn assoc_in(path: &Path, entry: impl Into<Fragment>) -> Self {
        path.iter().rev().fold(entry.into(), |inner, key| {
            let mut entries = BTreeMap::new();
            entries.insert(key.clone(), inner);
            Fragment::Map(entries)
        })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Fragment::Delete)
    }

    /// True for `Map` and for `Set` holding a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Fragment::Map(_) | Fragment::Set(Value::Map(_)))
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Fragment>> {
        match self {
            Fragment::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The value this fragment sets, if it is a `Set`.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Fragment::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Follow `path` through the fragment's maps.
    ///
    /// Observers use this to find out what a patch touched. Expects a
    /// normalized fragment; the store normalizes every fragment before
    /// handing it to observers.
    pub fn get_in(&self, path: &Path) -> Option<&Fragment> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Fragment::Map(entries) => entries.get(component)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Whether the fragment addresses `path` (or something below it).
    pub fn touches(&self, path: &Path) -> bool {
        self.get_in(path).is_some()
    }

    /// Keys directly under `path` that this fragment deletes.
    pub fn deleted_keys(&self, path: &Path) -> Vec<&str> {
        self.get_in(path)
            .and_then(Fragment::as_map)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, entry)| entry.is_delete())
                    .map(|(key, _)| key.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Convert every `Set(Value::Map)` into a `Map` node, recursively.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Fragment::Map(entries) => Fragment::Map(
                entries
                    .into_iter()
                    .map(|(key, entry)| (key, entry.normalized()))
                    .collect(),
            ),
            Fragment::Set(value) => Fragment::from(value),
            Fragment::Delete => Fragment::Delete,
        }
    }
}

impl From<Value> for Fragment {
    fn from(value: Value) -> Self {
        match value {
            Value::Map(map) => Fragment::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Fragment::from(value)))
                    .collect(),
            ),
            other => Fragment::Set(other),
        }
    }
}

impl From<&str> for Fragment {
    fn from(v: &str) -> Self {
        Fragment::Set(Value::from(v))
    }
}

impl From<String> for Fragment {
    fn from(v: String) -> Self {
        Fragment::Set(Value::from(v))
    }
}

impl From<bool> for Fragment {
    fn from(v: bool) -> Self {
        Fragment::Set(Value::from(v))
    }
}

impl From<i64> for Fragment {
    fn from(v: i64) -> Self {
        Fragment::Set(Value::from(v))
    }
}

impl From<i32> for Fragment {
    fn from(v: i32) -> Self {
        Fragment::Set(Value::from(v))
    }
}

impl From<f64> for Fragment {
    fn from(v: f64) -> Self {
        Fragment::Set(Value::from(v))
    }
}

impl From<Vec<Value>> for Fragment {
    fn from(v: Vec<Value>) -> Self {
        Fragment::Set(Value::Array(v))
    }
}

impl<K: Into<String>, V: Into<Fragment>> FromIterator<(K, V)> for Fragment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fragment::Map(
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

    #[test]
    fn assoc_in_nests_from_leaf_outward() {
        let fragment = Fragment::assoc_in(&path!("ui/item_editor/form/name"), "Ore");
        let expected = Fragment::map().with(
            "ui",
            Fragment::map().with(
                "item_editor",
                Fragment::map().with("form", Fragment::map().with("name", "Ore")),
            ),
        );
        assert_eq!(fragment, expected);
    }

    #[test]
    fn assoc_in_empty_path_is_root() {
        assert_eq!(Fragment::assoc_in(&path!(), 5), Fragment::Set(Value::from(5)));
        assert_eq!(Fragment::assoc_in(&path!(), TOMBSTONE), TOMBSTONE);
    }

    #[test]
    fn from_value_normalizes_maps() {
        let value = Value::from_iter([("items", Value::from_iter([("i1", "Ore")]))]);
        let fragment = Fragment::from(value);
        assert!(fragment.as_map().is_some());
        assert_eq!(
            fragment.get_in(&path!("items/i1")),
            Some(&Fragment::Set(Value::from("Ore")))
        );
    }

    #[test]
    fn normalized_rewrites_nested_sets() {
        let raw = Fragment::map().with(
            "world",
            Fragment::Set(Value::from_iter([("items", Value::map())])),
        );
        assert!(raw.get_in(&path!("world/items")).is_none());
        let normal = raw.normalized();
        assert_eq!(normal.get_in(&path!("world/items")), Some(&Fragment::map()));
    }

    #[test]
    fn with_replaces_non_map() {
        let fragment = Fragment::set(3).with("a", 1);
        assert_eq!(fragment, Fragment::from_iter([("a", 1)]));
    }

    #[test]
    fn touches_and_deleted_keys() {
        let fragment = Fragment::from_iter([(
            "world",
            Fragment::from_iter([(
                "items",
                Fragment::from_iter([("i1", TOMBSTONE), ("i2", Fragment::from("Plate"))]),
            )]),
        )]);
        assert!(fragment.touches(&path!("world/items")));
        assert!(!fragment.touches(&path!("world/factories")));
        assert_eq!(fragment.deleted_keys(&path!("world/items")), vec!["i1"]);
        assert!(fragment.deleted_keys(&path!("ui")).is_empty());
        assert!(fragment
            .get_in(&path!("world/items/i1"))
            .is_some_and(Fragment::is_delete));
    }

    #[test]
    fn is_map_covers_set_of_map() {
        assert!(Fragment::map().is_map());
        assert!(Fragment::Set(Value::map()).is_map());
        assert!(!Fragment::set("x").is_map());
        assert!(!TOMBSTONE.is_map());
    }
}
