use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::{NotificationConfig, Urgency};
use crate::error::{MonitorError, Result};

/// Delivery channel for alert notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> Result<()>;
}

/// Desktop notifications through the `notify-send` command
///
/// When the monitor runs as root through sudo, the notification is delivered
/// to the invoking user's session (`sudo -u $SUDO_USER DISPLAY=:0 notify-send ...`),
/// since root usually has no desktop session of its own.
#[derive(Debug, Clone)]
pub struct NotifySend {
    command: String,
    urgency: Urgency,
    icon: Option<String>,
    run_as: Option<String>,
}

impl NotifySend {
    pub fn new(command: impl Into<String>, urgency: Urgency, icon: Option<String>) -> Self {
        Self { command: command.into(), urgency, icon, run_as: None }
    }

    pub fn from_config(cfg: &NotificationConfig) -> Self {
        let run_as = if is_root::is_root() { desktop_user() } else { None };
        Self { run_as, ..Self::new(cfg.command.clone(), cfg.urgency, cfg.icon.clone()) }
    }

    pub fn run_as(mut self, user: Option<String>) -> Self {
        self.run_as = user;
        self
    }

    fn build_command(&self, title: &str, body: &str) -> Command {
        let mut args = vec![format!("--urgency={}", self.urgency.as_str())];
        if let Some(icon) = &self.icon {
            args.push(format!("--icon={icon}"));
        }
        args.push(title.to_string());
        args.push(body.to_string());

        let mut cmd = match &self.run_as {
            Some(user) => {
                let mut cmd = Command::new("sudo");
                cmd.arg("-u").arg(user).arg("DISPLAY=:0").arg(&self.command);
                cmd
            }
            None => Command::new(&self.command),
        };
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Notifier for NotifySend {
    async fn send(&self, title: &str, body: &str) -> Result<()> {
        debug!(command = %self.command, run_as = ?self.run_as, "sending desktop notification");
        let output = self
            .build_command(title, body)
            .output()
            .await
            .map_err(|e| MonitorError::Notification(format!("Failed to run {}: {e}", self.command)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MonitorError::Notification(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )))
        }
    }
}

fn desktop_user() -> Option<String> {
    env::var("SUDO_USER")
        .ok()
        .filter(|user| !user.is_empty() && user != "root")
}

/// Find an executable by name in `PATH`, or check an explicit path
pub fn locate_command(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(command))
        .find(|full| full.is_file())
}
