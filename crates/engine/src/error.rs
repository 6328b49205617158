//! Store error type
//!
//! Every operation of [`KeyedStore`](crate::KeyedStore) reports failure through
//! [`StoreError`]. Backend failures pass through unchanged; nothing is retried.

use keyedstore_backend::BackendError;
use keyedstore_core::CoreError;
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Operation attempted before `init` completed
    #[error("store is not initialized: call init first")]
    UninitializedStore,

    /// Sort key supplied where unsupported, or omitted where required
    #[error("invalid key usage: {0}")]
    InvalidKeyUsage(String),

    /// Remove of a key with no item
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored data does not have the shape the operation needs
    #[error("wrong type for {name}: expected {expected}, got {actual}")]
    WrongType {
        /// Attribute or field name
        name: String,
        /// Expected shape
        expected: String,
        /// Actual shape found
        actual: String,
    },

    /// JSON encode/decode failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid store configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure from the remote service
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Check if this error came from the backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, StoreError::Backend(_))
    }

    pub(crate) fn wrong_type(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        StoreError::WrongType {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl From<CoreError> for StoreError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidKeyUsage(msg) => StoreError::InvalidKeyUsage(msg),
            CoreError::WrongType {
                name,
                expected,
                actual,
            } => StoreError::WrongType {
                name,
                expected,
                actual,
            },
            CoreError::InvalidSchema(msg) => StoreError::Config(msg),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Config(e.to_string())
    }
}
