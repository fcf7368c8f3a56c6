mod loader;
mod monitor;
mod notification;
mod ranges;
mod root;
mod telemetry;
mod validator;

pub use loader::{load_from_path, load_from_str, read_from_path};
pub use monitor::MonitorConfig;
pub use notification::{NotificationConfig, Urgency};
pub use ranges::{ExclusionConfig, TargetRangeConfig};
pub use root::Config;
pub use telemetry::LoggingConfig;
pub use validator::validate;
