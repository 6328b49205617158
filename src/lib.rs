//! # Keyedstore
//!
//! Cached, schema-aware key-value access over a remote partition/sort-key
//! attribute table.
//!
//! ## Quick Start
//!
//! ```ignore
//! use keyedstore::prelude::*;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let store = KeyedStore::builder("Readings", AttributeDef::string("Beacon"))
//!     .sort_key(AttributeDef::number("At"))
//!     .build(backend)?;
//! store.init().await?;
//!
//! store.put("b1", Some(1.into()), "-40").await?;
//! let rows = store.get("b1", None, Page::all()).await?;
//!
//! store.put("b1", Some(2.into()), json!({"tags": ["a"]}).to_string()).await?;
//! store.union("b1", Some(2.into()), vec![("tags".into(), "b".into())]).await?;
//! ```
//!
//! ## Layers
//!
//! - [`keyedstore_core`] - scalar values, schemas, items, cache keys
//! - [`keyedstore_backend`] - the remote table contract and [`MemoryBackend`]
//! - [`keyedstore_engine`] - [`KeyedStore`], its read cache and configuration
//! - [`Site`] - the four tables of a positioning deployment
//!
//! Every store operation is an `async fn` returning a `Result`; nothing is
//! retried.

#![warn(missing_docs)]

mod error;
mod site;

pub mod prelude;

pub use error::{Error, Result};
pub use site::{NodePosition, Point, RoomOutline, Site, SiteBuilder, FLOORPLAN_ATTRIBUTE};

pub use keyedstore_backend::{Backend, BackendError, BackendErrorKind, MemoryBackend};
pub use keyedstore_core::{
    Attribute, AttributeDef, Item, Page, ScalarType, ScalarValue, Scalars, TableSchema,
    VALUE_ATTRIBUTE,
};
pub use keyedstore_engine::{
    KeyedStore, Replaced, SetOp, StoreBuilder, StoreConfig, StoreError, DEFAULT_CACHE_CAPACITY,
};
