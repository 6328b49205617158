//! Core types for keyedstore
//!
//! This crate defines the data model shared by every layer:
//! - [`ScalarValue`] / [`ScalarType`]: the two scalar kinds the remote table supports
//! - [`TableSchema`]: partition key plus optional sort key
//! - [`AttributeDef`] / [`Attribute`]: typed attribute descriptors and values
//! - [`Item`]: a flat attribute map, the normalized shape of every row
//! - [`CacheKey`]: read-cache key derivation
//! - [`CoreError`]: key and type validation failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache_key;
pub mod error;
pub mod item;
pub mod schema;
pub mod value;

pub use cache_key::CacheKey;
pub use error::CoreError;
pub use item::{project, Item, Page, Scalars, VALUE_ATTRIBUTE};
pub use schema::{Attribute, AttributeDef, TableSchema};
pub use value::{ScalarType, ScalarValue};
