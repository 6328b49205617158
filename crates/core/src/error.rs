//! Core error types
//!
//! Errors raised while validating keys and shaping items against a
//! [`TableSchema`](crate::TableSchema). They never involve the backend.

use thiserror::Error;

/// Errors produced by schema and item validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Sort key supplied where unsupported, omitted where required, or a
    /// key operation the schema cannot express
    #[error("invalid key usage: {0}")]
    InvalidKeyUsage(String),

    /// Value kind does not match the declared kind
    #[error("wrong type for {name}: expected {expected}, got {actual}")]
    WrongType {
        /// Attribute or key name
        name: String,
        /// Expected kind
        expected: String,
        /// Actual kind found
        actual: String,
    },

    /// Schema is malformed (empty names, duplicate key attributes)
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Check if this is a key usage error.
    pub fn is_invalid_key_usage(&self) -> bool {
        matches!(self, CoreError::InvalidKeyUsage(_))
    }
}
