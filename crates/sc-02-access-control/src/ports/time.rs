//! # Time Source Port
//!
//! Expiry checks compare stored timestamps against "now"; injecting the
//! clock keeps those checks testable with a fixed time.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::RwLock;

/// Provider of the current wall-clock time.
pub trait TimeSource: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests.
pub struct FixedTimeSource {
    now: RwLock<DateTime<Utc>>,
}

impl FixedTimeSource {
    /// Start the clock at a fixed millisecond timestamp.
    #[must_use]
    pub fn at_millis(ms: i64) -> Self {
        Self {
            now: RwLock::new(Utc.timestamp_millis_opt(ms).single().unwrap_or_default()),
        }
    }

    /// Move the clock.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().expect("lock poisoned") = now;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("lock poisoned")
    }
}
