//! # Federation Errors
//!
//! `NotFound` and `Unavailable` are deliberately distinct: absence of data
//! renders an empty state, infrastructure failure is retryable. Callers
//! must not conflate them.

use shared_types::StoreError;
use thiserror::Error;

/// Errors from person resolution and prefix search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FederationError {
    /// Every source answered and none had the person.
    #[error("Person not found in any source")]
    NotFound,

    /// Every source failed; nothing could be consulted. Retryable.
    #[error("All {sources_failed} federation sources unavailable")]
    Unavailable {
        /// How many sources were consulted and failed.
        sources_failed: usize,
    },

    /// A store error outside the per-source degradation path.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
