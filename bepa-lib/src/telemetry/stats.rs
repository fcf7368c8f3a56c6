/// What one scan cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// False when the scan failed or timed out and the cycle was skipped
    pub scanned: bool,
    pub connections: usize,
    pub matched: usize,
    pub excluded: usize,
    pub alerts: usize,
    pub notification_failures: usize,
}

impl CycleReport {
    pub fn skipped() -> Self {
        Self::default()
    }
}

/// Running totals over the life of the monitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub skipped_cycles: u64,
    pub connections: u64,
    pub matched: u64,
    pub excluded: u64,
    pub alerts: u64,
    pub notification_failures: u64,
}

impl MonitorStats {
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles = self.cycles.saturating_add(1);
        if !report.scanned {
            self.skipped_cycles = self.skipped_cycles.saturating_add(1);
        }
        self.connections = self.connections.saturating_add(report.connections as u64);
        self.matched = self.matched.saturating_add(report.matched as u64);
        self.excluded = self.excluded.saturating_add(report.excluded as u64);
        self.alerts = self.alerts.saturating_add(report.alerts as u64);
        self.notification_failures = self
            .notification_failures
            .saturating_add(report.notification_failures as u64);
    }
}
