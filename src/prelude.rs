//! Convenient imports for keyedstore.
//!
//! ```ignore
//! use keyedstore::prelude::*;
//!
//! let site = Site::open(Arc::new(MemoryBackend::new())).await?;
//! ```

// Entry points
pub use crate::{KeyedStore, Site, StoreBuilder, StoreConfig};

// Error handling
pub use crate::error::{Error, Result};

// Backends
pub use crate::{Backend, MemoryBackend};

// Core types
pub use crate::{Attribute, AttributeDef, Item, Page, ScalarValue, Scalars, VALUE_ATTRIBUTE};

// Site inputs
pub use crate::{NodePosition, Point, RoomOutline};

// Re-export serde_json for convenience
pub use serde_json::json;
