use std::net::SocketAddr;
use std::time::Instant;

use crate::matcher::TargetRange;
use crate::scanner::Connection;

/// Identity of a connection across scans: both endpoints plus the owning pid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub pid: Option<u32>,
}

impl Fingerprint {
    pub fn of(conn: &Connection) -> Self {
        Self { local: conn.local, remote: conn.remote, pid: conn.pid }
    }
}

/// Alert history for one fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub first_seen: Instant,
    pub last_notified: Instant,
    pub last_seen: Instant,
    /// Seen in the most recent scan
    pub present: bool,
}

impl AlertRecord {
    pub(super) fn new(now: Instant) -> Self {
        Self { first_seen: now, last_notified: now, last_seen: now, present: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// First sighting, or reappearance after the record was evicted
    New,
    /// Still (or again) present after the suppression window elapsed
    Reminder,
}

/// A match the tracker decided should be reported
#[derive(Debug, Clone)]
pub struct Alert {
    pub connection: Connection,
    pub range: TargetRange,
    pub kind: AlertKind,
    pub first_seen: Instant,
}
