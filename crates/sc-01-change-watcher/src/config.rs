//! # Watch Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a watch relay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatchConfig {
    /// First resubscribe delay after a transient loss, in milliseconds.
    pub initial_backoff_ms: u64,

    /// Ceiling for the resubscribe delay, in milliseconds.
    pub max_backoff_ms: u64,

    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,

    /// Event channel capacity between the relay and the consumer.
    ///
    /// A full channel backpressures the relay; the raw subscription then
    /// lags and skips to the latest state, which is the delivery guarantee
    /// this subsystem promises.
    pub channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            backoff_multiplier: 2.0,
            channel_capacity: 16,
        }
    }
}

impl WatchConfig {
    /// Config for testing (near-zero delays).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            initial_backoff_ms: 1,
            max_backoff_ms: 10,
            backoff_multiplier: 2.0,
            channel_capacity: 16,
        }
    }

    /// Initial backoff as a [`Duration`].
    #[must_use]
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Maximum backoff as a [`Duration`].
    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}
