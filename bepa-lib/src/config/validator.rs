use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::matcher::parse_range;

/// Check everything the monitor needs before it may start
///
/// Range syntax is checked here as well as when the matcher is built, so a
/// `--check` run reports the same errors a real start would.
pub fn validate(config: &Config) -> Result<()> {
    let monitor = &config.monitor;
    if monitor.interval_secs == 0 {
        return Err(MonitorError::Config("interval_secs must be > 0".into()));
    }

    let max_step = monitor.max_step_timeout();
    if let Some(ms) = monitor.scan_timeout_ms {
        if ms == 0 {
            return Err(MonitorError::Config("scan_timeout_ms must be > 0".into()));
        }
        if monitor.scan_timeout() > max_step {
            return Err(MonitorError::Config(format!(
                "scan_timeout_ms ({ms}) must not exceed half the polling interval ({}ms)",
                max_step.as_millis()
            )));
        }
    }
    if let Some(ms) = config.notification.timeout_ms {
        if ms == 0 {
            return Err(MonitorError::Config("notification timeout_ms must be > 0".into()));
        }
        if config.notification_timeout() > max_step {
            return Err(MonitorError::Config(format!(
                "notification timeout_ms ({ms}) must not exceed half the polling interval ({}ms)",
                max_step.as_millis()
            )));
        }
    }

    if config.targets.is_empty() {
        return Err(MonitorError::Config("at least one target range is required".into()));
    }
    for target in &config.targets {
        parse_range(&target.range)?;
        if target.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(MonitorError::Config(format!(
                "target '{}' has an empty label",
                target.range
            )));
        }
    }
    for exclusion in &config.exclusions {
        parse_range(&exclusion.range)?;
    }

    if config.notification.enabled && config.notification.command.trim().is_empty() {
        return Err(MonitorError::Config("notification command cannot be empty".into()));
    }

    Ok(())
}
