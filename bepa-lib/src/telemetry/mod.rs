pub mod stats;
pub mod tracing;

pub use stats::{CycleReport, MonitorStats};
pub use self::tracing::init_tracing;
