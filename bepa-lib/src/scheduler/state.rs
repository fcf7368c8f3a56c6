use std::fmt;

/// Where the scheduler is in its loop
///
/// `Idle -> Scanning -> Matching -> Tracking -> Dispatching -> Idle` once per
/// tick, and `ShuttingDown -> Terminated` after cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scanning,
    Matching,
    Tracking,
    Dispatching,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Scanning => "scanning",
            SchedulerState::Matching => "matching",
            SchedulerState::Tracking => "tracking",
            SchedulerState::Dispatching => "dispatching",
            SchedulerState::ShuttingDown => "shutting_down",
            SchedulerState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
