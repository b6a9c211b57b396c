//! # Access Control Configuration

use sc_01_change_watcher::WatchConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the access controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Identifier of the designated root identity. If this principal
    /// authenticates with no provisioned account record, one is created
    /// with active, non-expiring defaults - the single bootstrap special
    /// case in the system.
    pub bootstrap_root: String,

    /// Seconds without local activity before an active session is
    /// terminated. Default 40 minutes.
    pub inactivity_timeout_secs: u64,

    /// Watch relay settings for the in-session account subscription.
    pub watch: WatchConfig,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            bootstrap_root: "root".to_string(),
            inactivity_timeout_secs: 40 * 60,
            watch: WatchConfig::default(),
        }
    }
}

impl AccessConfig {
    /// Config for testing (short timeouts, fast watch retries).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bootstrap_root: "root".to_string(),
            inactivity_timeout_secs: 60,
            watch: WatchConfig::for_testing(),
        }
    }

    /// Inactivity timeout as a [`Duration`].
    #[must_use]
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}
