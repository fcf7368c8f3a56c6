use chrono::{DateTime, Local};
use std::fmt;
use std::net::SocketAddr;

/// Transport protocol of a socket entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
        }
    }
}

/// TCP connection state as reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnState {
    Closed,
    Listen,
    SynSent,
    SynReceived,
    Established,
    FinWait1,
    FinWait2,
    CloseWait,
    Closing,
    LastAck,
    TimeWait,
    DeleteTcb,
    Unknown,
}

impl ConnState {
    /// States in which the socket still has a live remote peer
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnState::SynSent
                | ConnState::SynReceived
                | ConnState::Established
                | ConnState::FinWait1
                | ConnState::FinWait2
                | ConnState::CloseWait
                | ConnState::Closing
                | ConnState::LastAck
        )
    }
}

/// One socket entry exactly as the connection listing produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConnection {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub protocol: Protocol,
    pub state: ConnState,
    /// Owning process, when the caller is allowed to see it
    pub pid: Option<u32>,
}

/// An outgoing connection observed during one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub protocol: Protocol,
    pub state: ConnState,
    pub pid: Option<u32>,
    pub process_name: Option<String>,
    pub observed_at: DateTime<Local>,
}

impl Connection {
    pub fn from_raw(raw: RawConnection, process_name: Option<String>, observed_at: DateTime<Local>) -> Self {
        Self {
            local: raw.local,
            remote: raw.remote,
            protocol: raw.protocol,
            state: raw.state,
            pid: raw.pid,
            process_name,
            observed_at,
        }
    }

    /// "name (PID n)", "PID n" or "unknown process", depending on what attribution found
    pub fn process_display(&self) -> String {
        match (&self.process_name, self.pid) {
            (Some(name), Some(pid)) => format!("{name} (PID {pid})"),
            (Some(name), None) => name.clone(),
            (None, Some(pid)) => format!("PID {pid}"),
            (None, None) => "unknown process".to_string(),
        }
    }
}

/// Whether process attribution was available for the whole snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// Every socket's owner could be looked up
    Complete,
    /// Only sockets owned by the current user carry a pid
    Partial,
}

/// Result of one scan
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub connections: Vec<Connection>,
    pub attribution: Attribution,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(pid: Option<u32>, name: Option<&str>) -> Connection {
        Connection {
            local: SocketAddr::from(([10, 0, 0, 2], 50000)),
            remote: SocketAddr::from(([10, 0, 0, 1], 443)),
            protocol: Protocol::Tcp,
            state: ConnState::Established,
            pid,
            process_name: name.map(str::to_string),
            observed_at: Local::now(),
        }
    }

    #[test]
    fn test_process_display() {
        assert_eq!(conn(Some(42), Some("curl")).process_display(), "curl (PID 42)");
        assert_eq!(conn(Some(42), None).process_display(), "PID 42");
        assert_eq!(conn(None, Some("curl")).process_display(), "curl");
        assert_eq!(conn(None, None).process_display(), "unknown process");
    }

    #[test]
    fn test_active_states() {
        assert!(ConnState::Established.is_active());
        assert!(ConnState::SynSent.is_active());
        assert!(ConnState::CloseWait.is_active());
        assert!(!ConnState::Listen.is_active());
        assert!(!ConnState::TimeWait.is_active());
        assert!(!ConnState::Closed.is_active());
        assert!(!ConnState::Unknown.is_active());
    }
}
