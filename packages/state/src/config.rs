//! Store configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`crate::Store`].
///
/// Every field has a default, so a partial JSON object (or `{}`) is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Catch panics raised by observers so the round and the commit go on.
    pub isolate_panics: bool,
    /// How many re-entrant patch rounds one outer call may trigger before
    /// the queue is dropped.
    pub max_reentrant_rounds: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            isolate_panics: true,
            max_reentrant_rounds: 1024,
        }
    }
}
