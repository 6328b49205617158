//! Backend error type
//!
//! Failures reported by the remote service. The store passes them through
//! unchanged; the kind is informational only, nothing is retried on it.

use std::fmt;
use thiserror::Error;

/// Failure category reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorKind {
    /// Table does not exist
    ResourceNotFound,
    /// Table already exists or is being created
    ResourceInUse,
    /// Request is malformed (bad key, wrong type, unsupported condition)
    Validation,
    /// Request rate exceeded the provisioned throughput
    Throttled,
    /// Transport or service-side failure
    Service,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendErrorKind::ResourceNotFound => "resource not found",
            BackendErrorKind::ResourceInUse => "resource in use",
            BackendErrorKind::Validation => "validation",
            BackendErrorKind::Throttled => "throttled",
            BackendErrorKind::Service => "service",
        };
        f.write_str(name)
    }
}

/// Opaque failure from the remote service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    /// Failure category
    pub kind: BackendErrorKind,
    /// Service-provided message
    pub message: String,
}

impl BackendError {
    /// Create an error
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Unknown table
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ResourceNotFound, message)
    }

    /// Table exists already
    pub fn resource_in_use(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ResourceInUse, message)
    }

    /// Malformed request
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Validation, message)
    }

    /// Service-side failure
    pub fn service(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Service, message)
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
