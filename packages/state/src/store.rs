//! The state store: one tree, changed only through patches.
//!
//! A patch round is: merge the fragment over the committed tree, hand
//! `(fragment, new, old)` to every observer, then commit `new`. Observers
//! that patch (or init) from inside their callback are queued; their rounds
//! run after the current one, in call order, before the outermost call
//! returns.
//!
//! The store is single-threaded by construction (`Rc`/`RefCell`). Share it
//! as an `Rc<Store>`; observers and setters that need to call back into it
//! should hold a `Weak` to avoid reference cycles.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::merge::merge;
use crate::observer::{ObserverRegistry, ObserverResult};
use crate::setter::Setter;
use crate::{Error, Fragment, Path, StoreConfig, Value};

enum Pending {
    Init(Fragment),
    Patch(Fragment),
}

/// The reactive state store.
///
/// # Example
///
/// ```rust
/// use factor_state::{path, Fragment, Store, Value, TOMBSTONE};
///
/// let store = Store::new();
/// store.init(Fragment::from_iter([("world", Fragment::from_iter([("items", Fragment::map())]))]));
///
/// store.assoc_in(&path!("world/items/i1/name"), "Ore").unwrap();
/// assert_eq!(store.get_in(&path!("world/items/i1/name")), Some(Value::from("Ore")));
///
/// store.assoc_in(&path!("world/items/i1"), TOMBSTONE).unwrap();
/// assert_eq!(store.get_in(&path!("world/items/i1")), None);
/// assert_eq!(store.get_in(&path!("world/items")), Some(Value::map()));
/// ```
pub struct Store {
    state: RefCell<Rc<Value>>,
    observers: RefCell<ObserverRegistry>,
    pending: RefCell<VecDeque<Pending>>,
    dispatching: Cell<bool>,
    config: StoreConfig,
}

impl Store {
    /// Create a store holding an empty map.
    pub fn new() -> Self {
        Self::with_config(Value::map(), StoreConfig::default())
    }

    /// Create a store with initial data.
    pub fn with_state(initial: Value) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    pub fn with_config(initial: Value, config: StoreConfig) -> Self {
        Self {
            state: RefCell::new(Rc::new(initial)),
            observers: RefCell::new(ObserverRegistry::new()),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Merge `fragment` into the state without notifying anyone.
    ///
    /// Meant for seeding defaults at startup. Called from inside an
    /// observer, it is queued behind the running round like a patch.
    pub fn init(&self, fragment: impl Into<Fragment>) {
        if let Err(e) = self.enqueue(Pending::Init(fragment.into())) {
            log::error!("queued patches dropped while applying init: {}", e);
        }
    }

    /// Merge `fragment` into the state and notify every observer.
    ///
    /// Observer failures are logged and do not affect the commit. The only
    /// error is hitting the re-entrant round cap.
    pub fn patch(&self, fragment: impl Into<Fragment>) -> Result<(), Error> {
        self.enqueue(Pending::Patch(fragment.into()))
    }

    /// Patch a single path. Pass [`crate::TOMBSTONE`] to delete it.
    pub fn assoc_in(&self, path: &Path, value: impl Into<Fragment>) -> Result<(), Error> {
        self.patch(Fragment::assoc_in(path, value))
    }

    /// The value at `path`, or `None` if any key along the way is missing.
    pub fn get_in(&self, path: &Path) -> Option<Value> {
        self.state.borrow().get(path).cloned()
    }

    /// A shared view of the committed tree.
    pub fn snapshot(&self) -> Rc<Value> {
        Rc::clone(&self.state.borrow())
    }

    /// Register an observer, replacing any observer with the same name.
    pub fn observe<F>(&self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&Fragment, &Value, &Value) -> ObserverResult + 'static,
    {
        self.observers.borrow_mut().observe(name, callback);
    }

    /// Remove an observer by name. Returns `false` if there was none.
    pub fn unobserve(&self, name: &str) -> bool {
        self.observers.borrow_mut().unobserve(name)
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.observers.borrow().contains(name)
    }

    /// Observer names in notification order.
    pub fn observer_names(&self) -> Vec<String> {
        self.observers
            .borrow()
            .names()
            .map(str::to_string)
            .collect()
    }

    /// A callback-friendly handle that patches `path` on every call.
    pub fn setter(self: &Rc<Self>, path: Path) -> Setter {
        Setter::new(Rc::downgrade(self), path)
    }

    fn enqueue(&self, op: Pending) -> Result<(), Error> {
        self.pending.borrow_mut().push_back(op);
        if self.dispatching.get() {
            log::debug!("queued operation behind the running round");
            return Ok(());
        }

        self.dispatching.set(true);
        let _guard = DispatchGuard { store: self };
        self.drain()
    }

    fn drain(&self) -> Result<(), Error> {
        let mut rounds = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(op) = next else {
                return Ok(());
            };

            match op {
                Pending::Init(fragment) => self.apply_silently(&fragment),
                Pending::Patch(fragment) => {
                    if rounds > self.config.max_reentrant_rounds {
                        let dropped = {
                            let mut pending = self.pending.borrow_mut();
                            let dropped = pending.len() + 1;
                            pending.clear();
                            dropped
                        };
                        log::error!(
                            "re-entrant patch limit reached after {} rounds, dropping {} operations",
                            rounds,
                            dropped
                        );
                        return Err(Error::ReentrancyLimit { rounds, dropped });
                    }
                    rounds += 1;
                    self.apply_round(fragment);
                }
            }
        }
    }

    fn apply_silently(&self, fragment: &Fragment) {
        let old = self.snapshot();
        let new = merge(&old, fragment).unwrap_or_else(Value::map);
        log::debug!("init merged without notification");
        *self.state.borrow_mut() = Rc::new(new);
    }

    fn apply_round(&self, fragment: Fragment) {
        let fragment = fragment.normalized();
        let old = self.snapshot();
        let new = Rc::new(merge(&old, &fragment).unwrap_or_else(Value::map));

        let observers = self.observers.borrow().clone();
        log::debug!("patch round, notifying {} observers", observers.len());
        let failures = observers.notify_all(&fragment, &new, &old, self.config.isolate_panics);
        if !failures.is_empty() {
            log::debug!(
                "{} observers failed, committing anyway",
                failures.len()
            );
        }

        *self.state.borrow_mut() = new;
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state.borrow())
            .field("observers", &self.observers.borrow())
            .field("config", &self.config)
            .finish()
    }
}

// Resets the dispatch flag even if a non-isolated observer panics, so the
// store keeps accepting patches afterwards.
struct DispatchGuard<'a> {
    store: &'a Store,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.store.pending.borrow_mut().clear();
        }
        self.store.dispatching.set(false);
    }
}
