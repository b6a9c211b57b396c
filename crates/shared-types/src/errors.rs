//! # Error Types
//!
//! Defines error types shared across subsystems.
//!
//! Infrastructure errors (`StoreError::Unreachable`) are the retryable
//! class; everything else is authoritative and must not be retried.

use thiserror::Error;

/// Errors surfaced by the document store boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Document does not exist.
    #[error("Document not found")]
    Missing,

    /// Transient connectivity loss. The watch layer retries this class
    /// with backoff; point reads surface it to the caller.
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    /// Permanent authorization failure. Never retried; terminates a watch.
    #[error("Store permission denied: {0}")]
    PermissionDenied(String),

    /// Document exists but cannot be decoded.
    #[error("Corrupt document {key}: {detail}")]
    Corrupt {
        /// Key of the undecodable document.
        key: String,
        /// What failed to decode.
        detail: String,
    },
}

impl StoreError {
    /// Whether this error is in the transient, retryable class.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Errors surfaced by the identity provider boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Bad identifier/secret pair. User-correctable; shown verbatim.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The provider requires a recent authentication for this operation.
    #[error("Operation requires recent authentication")]
    RequiresRecentAuth,

    /// The provider itself could not be reached.
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}
