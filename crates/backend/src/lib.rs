//! Backend contract for keyedstore
//!
//! The store talks to the remote attribute table only through the
//! [`Backend`] trait. This crate provides:
//! - [`Backend`]: list/create tables, query by key, put, delete, scan
//! - Request and response shapes ([`QueryRequest`], [`ScanRequest`], ...)
//! - [`BackendError`]: opaque service failures
//! - [`MemoryBackend`]: an in-process implementation with the service's semantics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod memory;
pub mod request;
pub mod traits;

pub use error::{BackendError, BackendErrorKind, BackendResult};
pub use memory::MemoryBackend;
pub use request::{
    Condition, CreateTableRequest, DeleteItemRequest, KeyCondition, KeySchemaElement, KeyType,
    PutItemRequest, QueryOutput, QueryRequest, ScanOutput, ScanRequest, Select, Throughput,
};
pub use traits::Backend;
