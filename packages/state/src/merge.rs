//! Deep merge of fragments into state trees.
//!
//! The rules, applied at every position of the tree:
//!
//! 1. If the incoming fragment is not a map (a leaf, an array or a delete
//!    marker), it wins outright. No recursion.
//! 2. If it is a map, it is merged key by key into the existing map. Keys
//!    the fragment does not mention are kept untouched. A non-map on the
//!    existing side contributes nothing.
//! 3. Keys that resolve to a delete marker are dropped from the result.
//!
//! Merging a sequence is a left fold of rule 1-3, so a non-map anywhere in a
//! sequence shadows everything that came before it at that position.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use crate::{Fragment, Value};

/// Merge `patch` over `base`.
///
/// Returns `None` only when the patch deletes the root itself.
///
/// ```rust
/// use factor_state::{merge, Fragment, Value};
///
/// let base = Value::from_iter([("a", Value::from_iter([("b", 1), ("c", 2)]))]);
/// let patch = Fragment::from_iter([("a", Fragment::from_iter([("b", 9)]))]);
/// let merged = merge(&base, &patch).unwrap();
/// assert_eq!(merged, Value::from_iter([("a", Value::from_iter([("b", 9), ("c", 2)]))]));
/// ```
pub fn merge(base: &Value, patch: &Fragment) -> Option<Value> {
    merge_at(Some(base), patch)
}

/// Merge an ordered sequence of fragments, later fragments taking precedence.
///
/// The result never contains a delete marker, which is why it is a plain
/// `Value`. Returns `None` for an empty sequence or when the last word on
/// the root is a delete.
pub fn deep_merge<I>(fragments: I) -> Option<Value>
where
    I: IntoIterator,
    I::Item: Borrow<Fragment>,
{
    fragments
        .into_iter()
        .fold(None, |acc, fragment| merge_at(acc.as_ref(), fragment.borrow()))
}

fn merge_at(base: Option<&Value>, patch: &Fragment) -> Option<Value> {
    match patch {
        Fragment::Delete => None,
        Fragment::Set(Value::Map(entries)) => Some(Value::Map(merge_values(base, entries))),
        Fragment::Set(value) => Some(value.clone()),
        Fragment::Map(entries) => Some(Value::Map(merge_entries(base, entries))),
    }
}

fn base_map(base: Option<&Value>) -> BTreeMap<String, Value> {
    match base {
        Some(Value::Map(map)) => map.clone(),
        _ => BTreeMap::new(),
    }
}

fn merge_entries(
    base: Option<&Value>,
    entries: &BTreeMap<String, Fragment>,
) -> BTreeMap<String, Value> {
    let mut result = base_map(base);
    for (key, entry) in entries {
        match merge_at(result.get(key), entry) {
            Some(value) => {
                result.insert(key.clone(), value);
            }
            None => {
                result.remove(key);
            }
        }
    }
    result
}

// A `Set(Value::Map)` merges like a map fragment. Plain values carry no
// delete markers, so every key survives.
fn merge_values(
    base: Option<&Value>,
    entries: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    let mut result = base_map(base);
    for (key, value) in entries {
        let merged = match value {
            Value::Map(inner) => Value::Map(merge_values(result.get(key), inner)),
            other => other.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{Path, Store};
    use proptest::prelude::*;

    // A tiny key alphabet so fragments collide with the tree and each other.
    fn key() -> impl Strategy<Value = String> {
        "[ab/]{0,2}"
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-3i64..3).prop_map(Value::Integer),
            "[xy]{0,2}".prop_map(Value::String),
            prop::collection::vec((0i64..3).prop_map(Value::Integer), 0..3).prop_map(Value::Array),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 32, 4, |inner| {
            prop::collection::btree_map(key(), inner, 0..4).prop_map(Value::Map)
        })
    }

    fn fragment() -> impl Strategy<Value = Fragment> {
        let entry = prop_oneof![leaf().prop_map(Fragment::Set), Just(Fragment::Delete)];
        entry.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::btree_map(key(), inner, 0..4).prop_map(Fragment::Map),
                tree().prop_map(Fragment::Set),
            ]
        })
    }

    fn root_tree() -> impl Strategy<Value = Value> {
        prop::collection::btree_map(key(), tree(), 0..4).prop_map(Value::Map)
    }

    fn root_patch() -> impl Strategy<Value = Fragment> {
        prop::collection::btree_map(key(), fragment(), 0..4).prop_map(Fragment::Map)
    }

    // Every non-map position a normalized fragment writes, with what it
    // writes there.
    fn writes<'a>(fragment: &'a Fragment, at: Path, out: &mut Vec<(Path, &'a Fragment)>) {
        match fragment {
            Fragment::Map(entries) => {
                for (key, entry) in entries {
                    writes(entry, at.child(key.as_str()), out);
                }
            }
            other => out.push((at, other)),
        }
    }

    proptest! {
        /// Two sequential merges equal one merge of the whole sequence.
        #[test]
        fn prop_sequential_equals_deep_merge(
            t0 in root_tree(),
            f1 in root_patch(),
            f2 in root_patch(),
        ) {
            let t1 = merge(&t0, &f1).expect("a map patch keeps the root");
            let stepwise = merge(&t1, &f2);
            let at_once = deep_merge([Fragment::from(t0), f1, f2]);
            prop_assert_eq!(stepwise, at_once);
        }

        /// Every delete in a patch leaves its key absent, even where the key
        /// never existed, and every leaf it sets is readable afterwards.
        #[test]
        fn prop_merge_applies_every_write(base in root_tree(), patch in root_patch()) {
            let merged = merge(&base, &patch).expect("a map patch keeps the root");
            let normal = patch.normalized();
            let mut out = Vec::new();
            writes(&normal, Path::root(), &mut out);
            for (path, write) in out {
                match write {
                    Fragment::Delete => {
                        prop_assert!(merged.get(&path).is_none(), "deleted {} survived", path);
                    }
                    Fragment::Set(value) => {
                        prop_assert_eq!(merged.get(&path), Some(value), "lost write at {}", path);
                    }
                    Fragment::Map(_) => unreachable!("writes only collects non-map positions"),
                }
            }
        }

        /// Patching a store one fragment at a time commits the same tree as
        /// merging the whole history at once.
        #[test]
        fn prop_store_commits_match_deep_merge(
            t0 in root_tree(),
            patches in prop::collection::vec(root_patch(), 1..4),
        ) {
            let store = Store::with_state(t0.clone());
            for patch in &patches {
                store.patch(patch.clone()).unwrap();
            }
            let expected = deep_merge(std::iter::once(Fragment::from(t0)).chain(patches));
            prop_assert_eq!(Some((*store.snapshot()).clone()), expected);
        }
    }
}
