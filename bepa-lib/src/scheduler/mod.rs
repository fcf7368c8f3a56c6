//! The monitoring loop.
//!
//! A single coordinator owns every component and runs
//! scan -> match -> track -> dispatch strictly in sequence, once per tick.
//! The tracker is never shared, so the one-alert-per-window guarantee needs no
//! locking. The blocking OS query runs on the blocking pool under a timeout;
//! notification delivery is bounded by the dispatcher's own timeout.

mod state;

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub use state::SchedulerState;

use crate::alert::AlertDispatcher;
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::matcher::{MatchOutcome, RangeMatcher};
use crate::scanner::{Attribution, ConnectionScanner, Snapshot};
use crate::telemetry::{CycleReport, MonitorStats};
use crate::tracker::{AlertKind, StateTracker};

pub struct Scheduler {
    scanner: ConnectionScanner,
    matcher: RangeMatcher,
    tracker: StateTracker,
    dispatcher: AlertDispatcher,
    interval: Duration,
    scan_timeout: Duration,
    state: SchedulerState,
    stats: MonitorStats,
    partial_attribution_logged: bool,
    /// A scan that outlived its timeout and may still be blocked in the OS
    stalled_scan: Option<JoinHandle<Result<Snapshot>>>,
}

impl Scheduler {
    pub fn new(
        scanner: ConnectionScanner,
        matcher: RangeMatcher,
        tracker: StateTracker,
        dispatcher: AlertDispatcher,
        interval: Duration,
        scan_timeout: Duration,
    ) -> Self {
        Self {
            scanner,
            matcher,
            tracker,
            dispatcher,
            interval,
            scan_timeout,
            state: SchedulerState::Idle,
            stats: MonitorStats::default(),
            partial_attribution_logged: false,
            stalled_scan: None,
        }
    }

    /// Wire up every component from a validated configuration.
    ///
    /// Fails with a configuration error on a malformed range or a required but
    /// missing notification command; nothing has been scanned at that point.
    pub fn from_config(config: &Config, scanner: ConnectionScanner) -> Result<Self> {
        let matcher = RangeMatcher::from_config(&config.targets, &config.exclusions)?;
        let tracker = StateTracker::new(
            config.monitor.suppression_window(),
            config.monitor.grace_period(),
        );
        let dispatcher = AlertDispatcher::from_config(config)?;
        Ok(Self::new(
            scanner,
            matcher,
            tracker,
            dispatcher,
            config.monitor.interval(),
            config.monitor.scan_timeout(),
        ))
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    pub fn matcher(&self) -> &RangeMatcher {
        &self.matcher
    }

    /// True while a timed-out scan is still running on the blocking pool
    pub fn scan_in_flight(&self) -> bool {
        self.stalled_scan.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// Cancellation is checked before each cycle and while waiting for the next
    /// tick; a cycle that has started always runs to completion.
    pub async fn run(&mut self, shutdown: CancellationToken) -> MonitorStats {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            scan_timeout_ms = self.scan_timeout.as_millis() as u64,
            targets = self.matcher.targets().len(),
            exclusions = self.matcher.exclusions().len(),
            "monitor started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if shutdown.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.run_cycle(Instant::now()).await;
            self.stats.record(&report);
            debug!(
                scanned = report.scanned,
                connections = report.connections,
                matched = report.matched,
                excluded = report.excluded,
                alerts = report.alerts,
                "cycle complete"
            );
        }

        self.state = SchedulerState::ShuttingDown;
        info!("shutdown requested, stopping monitor");
        self.tracker.reset();
        self.state = SchedulerState::Terminated;

        let stats = self.stats;
        info!(
            cycles = stats.cycles,
            skipped_cycles = stats.skipped_cycles,
            alerts = stats.alerts,
            notification_failures = stats.notification_failures,
            "monitor stopped"
        );
        stats
    }

    /// One full scan -> match -> track -> dispatch pass.
    ///
    /// A failed scan skips the cycle without touching the tracker, so
    /// connections are not treated as gone just because the OS query failed.
    pub async fn run_cycle(&mut self, now: Instant) -> CycleReport {
        self.state = SchedulerState::Scanning;
        let snapshot = match self.scan().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "scan failed, skipping cycle");
                self.state = SchedulerState::Idle;
                return CycleReport::skipped();
            }
        };
        if snapshot.attribution == Attribution::Partial && !self.partial_attribution_logged {
            info!("process attribution limited to processes owned by the current user");
            self.partial_attribution_logged = true;
        }

        self.state = SchedulerState::Matching;
        let mut report = CycleReport {
            scanned: true,
            connections: snapshot.connections.len(),
            ..CycleReport::default()
        };
        let mut matched = Vec::new();
        for connection in snapshot.connections {
            match self.matcher.classify(connection.remote.ip()) {
                MatchOutcome::Matched(range) => {
                    let range = range.clone();
                    matched.push((connection, range));
                }
                MatchOutcome::Excluded => {
                    trace!(remote = %connection.remote, "connection excluded");
                    report.excluded = report.excluded.saturating_add(1);
                }
                MatchOutcome::NoMatch => {}
            }
        }
        report.matched = matched.len();

        self.state = SchedulerState::Tracking;
        let alerts = self.tracker.update(now, matched);
        report.alerts = alerts.len();

        self.state = SchedulerState::Dispatching;
        for alert in &alerts {
            if alert.kind == AlertKind::Reminder {
                debug!(
                    remote = %alert.connection.remote,
                    open_secs = now.saturating_duration_since(alert.first_seen).as_secs(),
                    "matched connection still open"
                );
            }
            if let Err(e) = self.dispatcher.notify(&alert.connection, &alert.range).await {
                report.notification_failures = report.notification_failures.saturating_add(1);
                warn!(error = %e, remote = %alert.connection.remote, "notification not delivered");
            }
        }

        self.state = SchedulerState::Idle;
        report
    }

    /// At most one blocking scan exists at a time: while a timed-out one is
    /// still stuck, cycles are skipped instead of starting another.
    async fn scan(&mut self) -> Result<Snapshot> {
        if self.scan_in_flight() {
            return Err(MonitorError::Scan("previous scan still running".into()));
        }
        // A stalled scan that has since finished is stale.
        self.stalled_scan = None;

        let scanner = self.scanner.clone();
        let mut task = tokio::task::spawn_blocking(move || scanner.scan());
        match tokio::time::timeout(self.scan_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(MonitorError::Scan(format!("scan task failed: {e}"))),
            Err(_) => {
                self.stalled_scan = Some(task);
                Err(MonitorError::Scan(format!(
                    "scan timed out after {}ms",
                    self.scan_timeout.as_millis()
                )))
            }
        }
    }
}
