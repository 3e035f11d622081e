//! Protocol timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for the sync engine and host client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long a `getValue` round trip may take before the pending
    /// request is failed (ms).
    pub request_timeout_ms: u64,

    /// Delay before the post-edit height re-measurement, so layout can
    /// settle (ms).
    pub height_settle_ms: u64,

    /// Delay between focus-in and the caret geometry report (ms).
    pub caret_settle_ms: u64,

    /// Delay before the first height measurement after mount, absorbing
    /// asynchronous font and layout loading (ms).
    pub mount_measure_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 3000,
            height_settle_ms: 100,
            caret_settle_ms: 50,
            mount_measure_ms: 50,
        }
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn height_settle(&self) -> Duration {
        Duration::from_millis(self.height_settle_ms)
    }

    pub fn caret_settle(&self) -> Duration {
        Duration::from_millis(self.caret_settle_ms)
    }

    pub fn mount_measure(&self) -> Duration {
        Duration::from_millis(self.mount_measure_ms)
    }
}
