use serde::Deserialize;
use std::time::Duration;

use super::monitor::MonitorConfig;
use super::notification::NotificationConfig;
use super::ranges::{ExclusionConfig, TargetRangeConfig};
use super::telemetry::LoggingConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Polling, suppression and eviction timing
    pub monitor: MonitorConfig,
    /// Ranges whose use raises an alert, checked in order (first match wins)
    /// At least one target is required
    #[serde(default)]
    pub targets: Vec<TargetRangeConfig>,
    /// Addresses or ranges that never alert, even inside a target range
    /// Default: empty
    #[serde(default)]
    pub exclusions: Vec<ExclusionConfig>,
    /// Desktop notification delivery
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Upper bound for a single notification delivery
    pub fn notification_timeout(&self) -> Duration {
        self.notification
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.monitor.default_step_timeout())
    }
}
