use thiserror::Error;

/// Errors that can occur in the monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Permission error: {0}")]
    Permission(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Only configuration problems stop the monitor; everything else is retried next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
