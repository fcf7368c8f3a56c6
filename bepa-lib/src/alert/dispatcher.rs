use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::notifier::{locate_command, Notifier, NotifySend};
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::matcher::TargetRange;
use crate::scanner::Connection;

enum Delivery {
    /// Notifications switched off in configuration; alerts are only logged
    Disabled,
    /// Notifications wanted but no capability is present
    Unavailable,
    Notifier(Arc<dyn Notifier>),
}

/// Renders alerts and hands them to the notification capability
pub struct AlertDispatcher {
    delivery: Delivery,
    title: String,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn with_notifier(
        notifier: Arc<dyn Notifier>,
        title: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self { delivery: Delivery::Notifier(notifier), title: title.into(), timeout }
    }

    pub fn disabled() -> Self {
        Self { delivery: Delivery::Disabled, title: String::new(), timeout: Duration::ZERO }
    }

    pub fn unavailable(title: impl Into<String>) -> Self {
        Self { delivery: Delivery::Unavailable, title: title.into(), timeout: Duration::ZERO }
    }

    /// Build the dispatcher for a validated configuration.
    ///
    /// A missing notification command is fatal only when `notification.required`
    /// is set; otherwise the monitor runs and every alert logs a notification error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cfg = &config.notification;
        if !cfg.enabled {
            info!("desktop notifications disabled, alerts are logged only");
            return Ok(Self::disabled());
        }

        match locate_command(&cfg.command) {
            Some(path) => {
                info!(command = %path.display(), "desktop notifications enabled");
                Ok(Self::with_notifier(
                    Arc::new(NotifySend::from_config(cfg)),
                    cfg.title.clone(),
                    config.notification_timeout(),
                ))
            }
            None if cfg.required => Err(MonitorError::Config(format!(
                "notification command '{}' not found in PATH",
                cfg.command
            ))),
            None => {
                warn!(
                    command = %cfg.command,
                    "notification command not found, alerts will only be logged"
                );
                Ok(Self::unavailable(cfg.title.clone()))
            }
        }
    }

    pub fn is_delivering(&self) -> bool {
        matches!(self.delivery, Delivery::Notifier(_))
    }

    /// Emit one alert: always logged, then delivered if a notifier is present.
    pub async fn notify(&self, connection: &Connection, range: &TargetRange) -> Result<()> {
        warn!(
            remote = %connection.remote,
            local_port = connection.local.port(),
            pid = ?connection.pid,
            process = %connection.process_display(),
            range = %range,
            "ALERT: connection to monitored range"
        );

        match &self.delivery {
            Delivery::Disabled => Ok(()),
            Delivery::Unavailable => Err(MonitorError::Notification(
                "no notification capability available".to_string(),
            )),
            Delivery::Notifier(notifier) => {
                let body = format_message(connection, range);
                match tokio::time::timeout(self.timeout, notifier.send(&self.title, &body)).await {
                    Ok(result) => result,
                    Err(_) => Err(MonitorError::Notification(format!(
                        "delivery timed out after {}ms",
                        self.timeout.as_millis()
                    ))),
                }
            }
        }
    }
}

/// Notification body for a matched connection
pub fn format_message(connection: &Connection, range: &TargetRange) -> String {
    format!(
        "Connection detected to monitored range!\n\
         Target: {}\n\
         Process: {}\n\
         Range: {}\n\
         Time: {}",
        connection.remote,
        connection.process_display(),
        range,
        connection.observed_at.format("%Y-%m-%d %H:%M:%S"),
    )
}
