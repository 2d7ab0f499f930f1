// ── Runtime synchronization configuration ──
//
// These types describe *how often* and *how hard* to talk to a device.
// The CLI constructs them (usually via plugsync-config) and hands them
// in; core never reads config files.

use std::time::Duration;

/// Attempts per refresh cycle before a device is reported unavailable.
pub const MAX_ATTEMPTS: u32 = 20;
/// Fixed wait between failed attempts.
pub const SLEEP_TIME: Duration = Duration::from_secs(2);
/// Host scheduling period between refresh cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Concurrent blocking device calls across a fleet.
pub const DEFAULT_WORKERS: usize = 4;

/// Retry policy and scheduling for one synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Attempts per `refresh()` call. Must be at least 1.
    pub max_attempts: u32,
    /// Delay after each failed attempt that is followed by another.
    pub retry_delay: Duration,
    /// How often the poller starts a new refresh cycle.
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            retry_delay: SLEEP_TIME,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Configuration shared by every device in a [`Fleet`](crate::Fleet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetConfig {
    /// Size of the shared blocking worker pool.
    pub workers: usize,
    pub sync: SyncConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            sync: SyncConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_twenty_attempts_two_seconds_apart() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.max_attempts, 20);
        assert_eq!(cfg.retry_delay, Duration::from_secs(2));
        assert_eq!(FleetConfig::default().workers, DEFAULT_WORKERS);
    }
}
