//! Cached, schema-aware access to a partition/sort-key attribute table
//!
//! This crate provides:
//! - [`KeyedStore`]: point, partition and prefix reads, writes, updates,
//!   union/difference on stored JSON documents, and key scans
//! - [`ReadCache`] / [`PartitionLocks`]: the LRU read cache and the
//!   per-partition locks that keep it coherent with writes
//! - [`StoreConfig`] / [`StoreBuilder`]: configuration, loadable from TOML
//! - [`StoreError`]: the error type of every store operation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod error;
pub mod store;

pub use cache::{PartitionLocks, ReadCache};
pub use config::{StoreBuilder, StoreConfig, DEFAULT_CACHE_CAPACITY};
pub use error::{Result, StoreError};
pub use store::{KeyedStore, Replaced, SetOp};
