//! Typed access to the store.

use serde::de::DeserializeOwned;
use serde::Serialize;

use factor_state::{Error, Fragment, Path, Store};

use crate::convert::{fragment_from_json, from_value, to_value, value_to_json};

/// Extension trait for typed reads and writes.
///
/// Implemented for [`Store`]. Writes go through `patch`, so observers are
/// notified exactly as for hand-built fragments.
///
/// # Example
///
/// ```rust
/// use factor_serde_state::TypedState;
/// use factor_state::{path, Store};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Item {
///     name: String,
/// }
///
/// let store = Store::new();
/// let item = Item { name: "Ore".to_string() };
/// store.assoc_in_as(&path!("world/items/i1"), &item).unwrap();
///
/// let back: Option<Item> = store.get_in_as(&path!("world/items/i1")).unwrap();
/// assert_eq!(back, Some(item));
/// ```
pub trait TypedState {
    /// Read the value at `path` and deserialize it.
    ///
    /// A missing path is `Ok(None)`; a value of the wrong shape is an error.
    fn get_in_as<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, Error>;

    /// Read the value at `path` as JSON.
    fn get_in_json(&self, path: &Path) -> Option<serde_json::Value>;

    /// Serialize `data` and patch it in at `path`.
    fn assoc_in_as<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), Error>;

    /// Patch with a JSON document.
    fn patch_json(&self, json: serde_json::Value) -> Result<(), Error>;

    /// Seed with a JSON document without notifying observers.
    fn init_json(&self, json: serde_json::Value) -> Result<(), Error>;
}

impl TypedState for Store {
    fn get_in_as<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, Error> {
        let Some(value) = self.get_in(path) else {
            return Ok(None);
        };
        let typed = from_value(value)?;
        Ok(Some(typed))
    }

    fn get_in_json(&self, path: &Path) -> Option<serde_json::Value> {
        self.get_in(path).map(value_to_json)
    }

    fn assoc_in_as<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), Error> {
        let value = to_value(data)?;
        self.assoc_in(path, Fragment::from(value))
    }

    fn patch_json(&self, json: serde_json::Value) -> Result<(), Error> {
        log::debug!("patching from JSON");
        self.patch(fragment_from_json(json)?)
    }

    fn init_json(&self, json: serde_json::Value) -> Result<(), Error> {
        self.init(fragment_from_json(json)?);
        Ok(())
    }
}
