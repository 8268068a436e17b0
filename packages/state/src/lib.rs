//! Factor State: the reactive state tree behind the planner UI
//!
//! All application state lives in one [`Store`]:
//! - [`Value`]: the tree itself, maps all the way down to leaves
//! - [`Path`]: a sequence of keys addressing a node of the tree
//! - [`Fragment`]: a partial update, with [`TOMBSTONE`] marking deletions
//! - [`merge`]/[`deep_merge`]: how fragments land on the tree
//! - [`ObserverRegistry`]: named callbacks told about every patch
//! - [`Setter`]: a handle that patches one path per call
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use factor_state::{path, Fragment, Store, Value};
//!
//! let store = Rc::new(Store::new());
//! store.init(Fragment::from_iter([("world", Fragment::from_iter([("factories", Fragment::map())]))]));
//!
//! store.observe("menu", |patch: &Fragment, new: &Value, _old: &Value| {
//!     if patch.touches(&path!("world/factories")) {
//!         let count = new.get(&path!("world/factories")).and_then(Value::as_map).map_or(0, |f| f.len());
//!         println!("{} factories", count);
//!     }
//!     Ok(())
//! });
//!
//! store.assoc_in(&path!("world/factories/f1/name"), "Smelting").unwrap();
//! ```

mod config;
mod error;
mod fragment;
mod merge;
mod observer;
mod path;
mod setter;
mod store;
mod value;

pub use config::StoreConfig;
pub use error::Error;
pub use fragment::{Fragment, TOMBSTONE};
pub use merge::{deep_merge, merge};
pub use observer::{ObserverError, ObserverFailure, ObserverRegistry, ObserverResult};
pub use path::Path;
pub use setter::Setter;
pub use store::Store;
pub use value::Value;
