use serde::Deserialize;
use std::time::Duration;

/// Timing configuration for the scan loop
///
/// The suppression window and grace period have no defaults: they decide how
/// noisy the monitor is and must be chosen explicitly.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Polling interval in seconds
    /// Must be > 0
    /// Default: 2
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Minimum time between two alerts for the same connection, in seconds
    pub suppression_window_secs: u64,
    /// How long a connection may be missing from scans before it is forgotten, in seconds
    /// A connection that comes back after this is alerted as new
    pub grace_period_secs: u64,
    /// Upper bound for one OS connection listing, in milliseconds
    /// Must not exceed half the polling interval
    /// Default: a quarter of the polling interval
    #[serde(default)]
    pub scan_timeout_ms: Option<u64>,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn suppression_window(&self) -> Duration {
        Duration::from_secs(self.suppression_window_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        self.scan_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.default_step_timeout())
    }

    /// Largest timeout a blocking step may be configured with
    pub fn max_step_timeout(&self) -> Duration {
        self.interval() / 2
    }

    pub(crate) fn default_step_timeout(&self) -> Duration {
        self.interval() / 4
    }
}

fn default_interval() -> u64 {
    2
}
