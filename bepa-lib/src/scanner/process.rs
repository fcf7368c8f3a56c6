use std::sync::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::{MonitorError, Result};

/// Resolves process names for pids found in a connection listing
pub trait ProcessLookup: Send + Sync {
    /// Called once per scan with every pid of the snapshot, before any `name` call.
    fn refresh(&self, _pids: &[u32]) {}

    fn name(&self, pid: u32) -> Result<String>;
}

/// Process names from `sysinfo`, refreshed only for the pids of the current scan
pub struct SysinfoLookup {
    system: Mutex<System>,
}

impl SysinfoLookup {
    pub fn new() -> Self {
        Self { system: Mutex::new(System::new()) }
    }
}

impl Default for SysinfoLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLookup for SysinfoLookup {
    fn refresh(&self, pids: &[u32]) {
        let pids: Vec<Pid> = pids.iter().copied().map(Pid::from_u32).collect();
        match self.system.lock() {
            Ok(mut system) => {
                system.refresh_processes_specifics(
                    ProcessesToUpdate::Some(&pids),
                    true,
                    ProcessRefreshKind::nothing(),
                );
            }
            Err(_) => tracing::warn!("process table lock poisoned"),
        }
    }

    fn name(&self, pid: u32) -> Result<String> {
        let system = self
            .system
            .lock()
            .map_err(|_| MonitorError::Permission("process table lock poisoned".into()))?;
        system
            .process(Pid::from_u32(pid))
            .map(|p| p.name().to_string_lossy().into_owned())
            .ok_or_else(|| MonitorError::Permission(format!("cannot inspect process {pid}")))
    }
}
