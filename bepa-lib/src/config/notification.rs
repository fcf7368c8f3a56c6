use serde::Deserialize;

/// Urgency hint passed to the desktop notification daemon
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    #[default]
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// Desktop notification configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Send desktop notifications for alerts
    /// Alerts are always logged regardless of this flag
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Refuse to start when the notification command cannot be found
    /// When false, a missing command only produces a warning and alerts are logged
    /// Default: false
    #[serde(default)]
    pub required: bool,
    /// Executable used for delivery, looked up in PATH
    /// Default: "notify-send"
    #[serde(default = "default_command")]
    pub command: String,
    /// Notification title
    /// Default: "Bepa Alert"
    #[serde(default = "default_title")]
    pub title: String,
    /// Default: critical
    #[serde(default)]
    pub urgency: Urgency,
    /// Icon name from the desktop icon theme
    /// Default: "dialog-warning"
    #[serde(default = "default_icon")]
    pub icon: Option<String>,
    /// Upper bound for one delivery, in milliseconds
    /// Must not exceed half the polling interval
    /// Default: a quarter of the polling interval
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            required: false,
            command: default_command(),
            title: default_title(),
            urgency: Urgency::default(),
            icon: default_icon(),
            timeout_ms: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_command() -> String {
    "notify-send".to_string()
}

fn default_title() -> String {
    "Bepa Alert".to_string()
}

fn default_icon() -> Option<String> {
    Some("dialog-warning".to_string())
}
