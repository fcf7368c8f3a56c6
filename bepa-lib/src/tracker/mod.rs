//! Cross-cycle alert deduplication.
//!
//! The tracker is the only state that survives from one scan to the next. It
//! maps each matched connection's [`Fingerprint`] to an [`AlertRecord`] and
//! decides, per scan, which matches deserve an alert:
//!
//! - unknown fingerprint: alert ([`AlertKind::New`])
//! - known, last alert younger than the suppression window: stay quiet
//! - known, last alert older than the suppression window: alert again
//!   ([`AlertKind::Reminder`])
//!
//! Records missing from a scan are kept for the grace period so a short
//! reconnect is a continuation. Past the grace period they are evicted and a
//! later sighting counts as new. The gap is also checked on reappearance, so a
//! record that no scan evicted (failed scans, a grace period shorter than the
//! polling interval) still starts over.
//!
//! Time is always passed in by the caller, which keeps the tracker
//! deterministic under test.

mod record;

use ahash::AHashMap;
use std::collections::hash_map::Entry;
use std::time::{Duration, Instant};

pub use record::{Alert, AlertKind, AlertRecord, Fingerprint};

use crate::matcher::TargetRange;
use crate::scanner::Connection;

#[derive(Debug)]
pub struct StateTracker {
    records: AHashMap<Fingerprint, AlertRecord>,
    suppression_window: Duration,
    grace_period: Duration,
}

impl StateTracker {
    pub fn new(suppression_window: Duration, grace_period: Duration) -> Self {
        Self { records: AHashMap::new(), suppression_window, grace_period }
    }

    /// Feed one scan's matched connections; returns the ones to alert on.
    pub fn update(
        &mut self,
        now: Instant,
        matched: impl IntoIterator<Item = (Connection, TargetRange)>,
    ) -> Vec<Alert> {
        for record in self.records.values_mut() {
            record.present = false;
        }

        let mut alerts = Vec::new();
        for (connection, range) in matched {
            let fingerprint = Fingerprint::of(&connection);
            match self.records.entry(fingerprint) {
                Entry::Vacant(slot) => {
                    slot.insert(AlertRecord::new(now));
                    alerts.push(Alert { connection, range, kind: AlertKind::New, first_seen: now });
                }
                Entry::Occupied(mut slot) => {
                    let record = slot.get_mut();
                    if record.present {
                        // Same socket listed twice in one snapshot.
                        continue;
                    }
                    // Gone past the grace period even if no scan got to evict it.
                    if now.saturating_duration_since(record.last_seen) > self.grace_period {
                        *record = AlertRecord::new(now);
                        alerts.push(Alert { connection, range, kind: AlertKind::New, first_seen: now });
                        continue;
                    }
                    record.present = true;
                    record.last_seen = now;
                    if now.saturating_duration_since(record.last_notified) >= self.suppression_window {
                        record.last_notified = now;
                        alerts.push(Alert {
                            connection,
                            range,
                            kind: AlertKind::Reminder,
                            first_seen: record.first_seen,
                        });
                    }
                }
            }
        }

        let grace = self.grace_period;
        self.records
            .retain(|_, r| r.present || now.saturating_duration_since(r.last_seen) <= grace);

        alerts
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&AlertRecord> {
        self.records.get(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget every record; the next sighting of anything alerts as new.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    pub fn suppression_window(&self) -> Duration {
        self.suppression_window
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }
}
