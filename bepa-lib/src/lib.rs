#![forbid(unsafe_code)]

pub mod alert;
pub mod config;
pub mod error;
pub mod matcher;
pub mod scanner;
pub mod scheduler;
pub mod telemetry;
pub mod tracker;

pub use alert::{AlertDispatcher, Notifier, NotifySend};
pub use config::{load_from_path, Config};
pub use error::{MonitorError, Result};
pub use matcher::{MatchOutcome, RangeMatcher, TargetRange};
pub use scanner::{ConnectionScanner, ConnectionSource, ProcessLookup};
pub use scheduler::{Scheduler, SchedulerState};
pub use tracker::StateTracker;
