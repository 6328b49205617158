//! Unified error types for keyedstore.
//!
//! This module wraps the per-crate errors and presents one interface to
//! users of the facade.

use keyedstore_backend::{BackendError, BackendErrorKind};
use keyedstore_core::CoreError;
use keyedstore_engine::StoreError;
use thiserror::Error;

/// All keyedstore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation attempted before the store was initialized
    #[error("store is not initialized")]
    UninitializedStore,

    /// Sort key misuse or an attempt to overwrite a key attribute
    #[error("invalid key usage: {0}")]
    InvalidKeyUsage(String),

    /// No item under the key
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored data has an unexpected shape
    #[error("wrong type for {name}: expected {expected}, got {actual}")]
    WrongType {
        /// Attribute or field name
        name: String,
        /// Expected type
        expected: String,
        /// Actual type found
        actual: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration or schema
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Remote service failure, passed through unchanged
    #[error("backend error: {0}")]
    Backend(BackendError),
}

/// Result type for keyedstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this error came from the backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Kind of the backend failure, if this is one.
    pub fn backend_kind(&self) -> Option<BackendErrorKind> {
        match self {
            Error::Backend(e) => Some(e.kind),
            _ => None,
        }
    }
}

// Convert from store errors
impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UninitializedStore => Error::UninitializedStore,
            StoreError::InvalidKeyUsage(msg) => Error::InvalidKeyUsage(msg),
            StoreError::NotFound(msg) => Error::NotFound(msg),
            StoreError::WrongType {
                name,
                expected,
                actual,
            } => Error::WrongType {
                name,
                expected,
                actual,
            },
            StoreError::Serialization(msg) => Error::Serialization(msg),
            StoreError::Config(msg) => Error::Config(msg),
            StoreError::Backend(e) => Error::Backend(e),
        }
    }
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::Backend(e)
    }
}

impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        StoreError::from(e).into()
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
