//! # Access Control Errors
//!
//! Policy outcomes (`Denied`) are authoritative decisions and are never
//! retried; infrastructure errors (`Store`, `Provider`) may be retried by
//! the caller.

use super::policy::DenyReason;
use shared_types::{AuthError, StoreError};
use thiserror::Error;

/// Errors from authorization and session operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Bad identifier/secret pair. User-correctable; shown verbatim.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but no account record is provisioned. Fatal for the
    /// session; forces logout.
    #[error("No account record provisioned for this principal")]
    ProfileNotFound,

    /// Policy rejection. Routes to the dedicated blocked/expired screen.
    #[error("Access denied: {}", match .0 {
        DenyReason::Blocked => "account blocked",
        DenyReason::Expired => "license expired",
    })]
    Denied(DenyReason),

    /// The provider wants a recent authentication for this operation.
    #[error("Operation requires recent authentication")]
    RequiresRecentAuth,

    /// Document store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider failure.
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// The operation is not valid in the session's current state.
    #[error("Invalid in current state: {0}")]
    InvalidState(&'static str),
}

impl From<AuthError> for AccessError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::RequiresRecentAuth => Self::RequiresRecentAuth,
            AuthError::ProviderUnavailable(msg) => Self::Provider(msg),
        }
    }
}
