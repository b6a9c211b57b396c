//! # Resubscribe Backoff
//!
//! Exponential delay schedule for watch resubscription after transient loss.

use crate::config::WatchConfig;
use std::time::Duration;

/// Exponential backoff state for one relay.
///
/// Reset to the initial delay after every successful resubscribe, so a
/// long-healthy watch that drops again starts from the short delay.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    current: Duration,
}

impl Backoff {
    /// Create a backoff schedule from a watch config.
    #[must_use]
    pub fn new(config: &WatchConfig) -> Self {
        let initial = config.initial_backoff();
        Self {
            initial,
            max: config.max_backoff(),
            multiplier: config.backoff_multiplier,
            current: initial,
        }
    }

    /// The delay to sleep before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let scaled = self.current.as_millis() as f64 * self.multiplier;
        self.current = Duration::from_millis(scaled as u64).min(self.max);
        delay
    }

    /// Return to the initial delay after a successful resubscribe.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
