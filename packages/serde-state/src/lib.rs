//! Serde integration for the Factor state store
//!
//! This layer adds typed and JSON access on top of `factor-state`:
//! - `TypedState`: read into and write from Rust types
//! - Value <-> serde and Value <-> serde_json conversions
//! - JSON documents as patch fragments, and `StoreConfig` from JSON
//!
//! # Example
//!
//! ```rust
//! use factor_serde_state::TypedState;
//! use factor_state::{path, Store};
//! use serde_json::json;
//!
//! let store = Store::new();
//! store.init_json(json!({"world": {"items": {}}, "ui": {}})).unwrap();
//! store.patch_json(json!({"world": {"items": {"i1": {"name": "Ore"}}}})).unwrap();
//!
//! let name: Option<String> = store.get_in_as(&path!("world/items/i1/name")).unwrap();
//! assert_eq!(name.as_deref(), Some("Ore"));
//! ```

mod convert;
mod typed;

pub use convert::{
    config_from_json, fragment_from_json, from_value, json_to_value, to_value, value_to_json,
};
pub use typed::TypedState;

// Re-export core types for convenience
pub use factor_state::{Error, Fragment, Path, Store, StoreConfig, Value, TOMBSTONE};
