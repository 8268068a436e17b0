//! Setters: turn externally supplied values into patches at a fixed path.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::{Error, Fragment, Path, Store, Value, TOMBSTONE};

/// Patches one path of a store each time it is called.
///
/// Every call produces exactly one patch; nothing is buffered. The setter
/// only holds a weak handle, so widgets keeping a setter around do not keep
/// the store alive.
///
/// ```rust
/// use std::rc::Rc;
/// use factor_state::{path, Store, Value};
///
/// let store = Rc::new(Store::new());
/// let set_name = store.setter(path!("ui/item_editor/form/name"));
/// set_name.set("Iron ore").unwrap();
/// assert_eq!(
///     store.get_in(&path!("ui/item_editor/form/name")),
///     Some(Value::from("Iron ore"))
/// );
/// ```
#[derive(Clone)]
pub struct Setter {
    store: Weak<Store>,
    path: Path,
}

impl Setter {
    pub(crate) fn new(store: Weak<Store>, path: Path) -> Self {
        Self { store, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Patch the setter's path with `value`.
    pub fn set(&self, value: impl Into<Fragment>) -> Result<(), Error> {
        let store: Rc<Store> = self.store.upgrade().ok_or(Error::StoreDropped)?;
        store.assoc_in(&self.path, value)
    }

    /// Remove the setter's path from the tree.
    pub fn delete(&self) -> Result<(), Error> {
        self.set(TOMBSTONE)
    }

    /// A plain callback for widget-style slots. Errors are logged.
    pub fn into_callback(self) -> Box<dyn Fn(Value)> {
        Box::new(move |value| {
            if let Err(e) = self.set(value) {
                log::warn!("setter for '{}' failed: {}", self.path, e);
            }
        })
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("path", &self.path)
            .field("store_alive", &(self.store.strong_count() > 0))
            .finish()
    }
}
