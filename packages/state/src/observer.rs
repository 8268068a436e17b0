//! Named observers notified on every patch.
//!
//! Observers run synchronously, in registration order. Registering under a
//! name that is already taken swaps the callback but keeps its slot, so an
//! observer that re-registers itself is still notified at the same point in
//! the round.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::{Fragment, Value};

/// Error type observers may return.
pub type ObserverError = Box<dyn std::error::Error>;

/// What an observer callback returns.
pub type ObserverResult = Result<(), ObserverError>;

type Callback = Rc<RefCell<dyn FnMut(&Fragment, &Value, &Value) -> ObserverResult>>;

/// An observer that did not complete normally during a round.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverFailure {
    #[error("observer '{name}' failed: {message}")]
    Error { name: String, message: String },
    #[error("observer '{name}' panicked: {message}")]
    Panic { name: String, message: String },
}

impl ObserverFailure {
    pub fn name(&self) -> &str {
        match self {
            ObserverFailure::Error { name, .. } | ObserverFailure::Panic { name, .. } => name,
        }
    }
}

#[derive(Clone)]
struct Entry {
    name: Rc<str>,
    callback: Callback,
}

/// Table of observers keyed by name.
///
/// Cloning is cheap (callbacks are shared), which lets the store take a
/// snapshot before a round so observers can register or unregister while
/// being notified. Such changes apply from the next round on.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    entries: Vec<Entry>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`, replacing any previous observer of
    /// that name. Returns `true` when an observer was replaced.
    pub fn observe<F>(&mut self, name: impl Into<String>, callback: F) -> bool
    where
        F: FnMut(&Fragment, &Value, &Value) -> ObserverResult + 'static,
    {
        let name: String = name.into();
        let callback: Callback = Rc::new(RefCell::new(callback));
        if let Some(entry) = self.entries.iter_mut().find(|e| *e.name == *name) {
            log::debug!("replacing observer '{}'", name);
            entry.callback = callback;
            true
        } else {
            log::debug!("registering observer '{}'", name);
            self.entries.push(Entry {
                name: Rc::from(name),
                callback,
            });
            false
        }
    }

    /// Remove the observer registered under `name`. No-op if absent.
    pub fn unobserve(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &*e.name != name);
        let removed = self.entries.len() != before;
        if removed {
            log::debug!("removed observer '{}'", name);
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| &*e.name == name)
    }

    /// Observer names in notification order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| &*e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke every observer once with `(fragment, new, old)`.
    ///
    /// A failing observer is logged and reported, and never keeps the
    /// others from running. Panics are only caught when `isolate_panics` is
    /// set; otherwise they propagate to the caller.
    pub fn notify_all(
        &self,
        fragment: &Fragment,
        new: &Value,
        old: &Value,
        isolate_panics: bool,
    ) -> Vec<ObserverFailure> {
        let mut failures = Vec::new();
        for entry in &self.entries {
            // An observer that is still running higher up the stack is
            // skipped rather than re-entered.
            let Ok(mut callback) = entry.callback.try_borrow_mut() else {
                log::warn!("observer '{}' is already running, skipping", entry.name);
                continue;
            };

            let outcome = if isolate_panics {
                panic::catch_unwind(AssertUnwindSafe(|| (&mut *callback)(fragment, new, old)))
            } else {
                Ok((&mut *callback)(fragment, new, old))
            };

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::warn!("observer '{}' failed: {}", entry.name, e);
                    failures.push(ObserverFailure::Error {
                        name: entry.name.to_string(),
                        message: e.to_string(),
                    });
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::error!("observer '{}' panicked: {}", entry.name, message);
                    failures.push(ObserverFailure::Panic {
                        name: entry.name.to_string(),
                        message,
                    });
                }
            }
        }
        failures
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
