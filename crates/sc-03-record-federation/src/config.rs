//! # Federation Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the record federator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Per-source cap on prefix-search hits, bounding worst-case fan-out.
    pub per_source_limit: usize,

    /// Cap on the merged, deduplicated search result.
    pub max_results: usize,

    /// Deadline for each source query, in milliseconds. A source that
    /// misses the deadline degrades to an empty contribution.
    pub query_timeout_ms: u64,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            per_source_limit: 10,
            max_results: 20,
            query_timeout_ms: 5_000,
        }
    }
}

impl FederationConfig {
    /// Config for testing (tight timeout).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            per_source_limit: 10,
            max_results: 20,
            query_timeout_ms: 1_000,
        }
    }

    /// Per-query deadline as a [`Duration`].
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}
