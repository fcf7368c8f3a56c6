//! Outgoing connection snapshots.
//!
//! The scanner sits between the raw OS listing ([`ConnectionSource`]) and the
//! rest of the pipeline. It keeps only outgoing connections with a live remote
//! peer and attaches process names where the listing exposed a pid. Missing
//! attribution is never an error: the snapshot carries an [`Attribution`] flag
//! instead, so matching and tracking never need to know why a pid is absent.

mod connection;
mod process;
mod source;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Local;
use tracing::debug;

pub use connection::{Attribution, ConnState, Connection, Protocol, RawConnection, Snapshot};
pub use process::{ProcessLookup, SysinfoLookup};
pub use source::{ConnectionSource, NetstatSource};

use crate::error::Result;

#[derive(Clone)]
pub struct ConnectionScanner {
    source: Arc<dyn ConnectionSource>,
    lookup: Arc<dyn ProcessLookup>,
    attribution: Attribution,
}

impl ConnectionScanner {
    pub fn new(
        source: Arc<dyn ConnectionSource>,
        lookup: Arc<dyn ProcessLookup>,
        attribution: Attribution,
    ) -> Self {
        Self { source, lookup, attribution }
    }

    /// Scanner over the real OS tables; attribution depends on running as root.
    pub fn system() -> Self {
        let attribution = if is_root::is_root() {
            Attribution::Complete
        } else {
            Attribution::Partial
        };
        Self::new(Arc::new(NetstatSource), Arc::new(SysinfoLookup::new()), attribution)
    }

    pub fn attribution(&self) -> Attribution {
        self.attribution
    }

    /// Take a fresh snapshot of outgoing connections.
    ///
    /// Dropped entries: non-active TCP states, unspecified or loopback remotes,
    /// and accepted inbound connections (local port owned by a listener).
    pub fn scan(&self) -> Result<Snapshot> {
        let raw = self.source.list()?;
        let observed_at = Local::now();

        let listening_ports: HashSet<u16> = raw
            .iter()
            .filter(|r| r.state == ConnState::Listen)
            .map(|r| r.local.port())
            .collect();

        let outgoing: Vec<RawConnection> = raw
            .into_iter()
            .filter(|r| is_outgoing(r, &listening_ports))
            .collect();

        let pids: Vec<u32> = outgoing
            .iter()
            .filter_map(|r| r.pid)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if !pids.is_empty() {
            self.lookup.refresh(&pids);
        }

        let connections = outgoing
            .into_iter()
            .map(|r| {
                let name = r.pid.and_then(|pid| match self.lookup.name(pid) {
                    Ok(name) => Some(name),
                    Err(e) => {
                        debug!(pid, error = %e, "process name unavailable");
                        None
                    }
                });
                Connection::from_raw(r, name, observed_at)
            })
            .collect();

        Ok(Snapshot { connections, attribution: self.attribution })
    }
}

fn is_outgoing(raw: &RawConnection, listening_ports: &HashSet<u16>) -> bool {
    if !raw.state.is_active() {
        return false;
    }
    let remote_ip = raw.remote.ip().to_canonical();
    if remote_ip.is_unspecified() || remote_ip.is_loopback() || raw.remote.port() == 0 {
        return false;
    }
    !listening_ports.contains(&raw.local.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use std::net::SocketAddr;
    use std::str::FromStr;

    struct FixedSource(Vec<RawConnection>);

    impl ConnectionSource for FixedSource {
        fn list(&self) -> Result<Vec<RawConnection>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl ConnectionSource for FailingSource {
        fn list(&self) -> Result<Vec<RawConnection>> {
            Err(MonitorError::Scan("netlink unavailable".into()))
        }
    }

    struct Names;

    impl ProcessLookup for Names {
        fn name(&self, pid: u32) -> Result<String> {
            match pid {
                100 => Ok("curl".to_string()),
                _ => Err(MonitorError::Permission(format!("cannot inspect process {pid}"))),
            }
        }
    }

    fn addr(s: &str) -> SocketAddr {
        SocketAddr::from_str(s).unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)))
    }

    fn raw(local: &str, remote: &str, state: ConnState, pid: Option<u32>) -> RawConnection {
        RawConnection {
            local: addr(local),
            remote: addr(remote),
            protocol: Protocol::Tcp,
            state,
            pid,
        }
    }

    fn scanner(entries: Vec<RawConnection>) -> ConnectionScanner {
        ConnectionScanner::new(Arc::new(FixedSource(entries)), Arc::new(Names), Attribution::Partial)
    }

    #[test]
    fn test_keeps_active_outgoing_connections() -> Result<()> {
        let s = scanner(vec![
            raw("10.0.0.2:50000", "192.168.1.10:443", ConnState::Established, Some(100)),
            raw("10.0.0.2:50001", "192.168.1.11:22", ConnState::SynSent, None),
        ]);
        let snapshot = s.scan()?;
        assert_eq!(snapshot.connections.len(), 2);
        assert_eq!(snapshot.attribution, Attribution::Partial);
        Ok(())
    }

    #[test]
    fn test_drops_listeners_loopback_and_inactive() -> Result<()> {
        let s = scanner(vec![
            raw("0.0.0.0:22", "0.0.0.0:0", ConnState::Listen, None),
            raw("127.0.0.1:40000", "127.0.0.1:5432", ConnState::Established, None),
            raw("[::1]:40001", "[::1]:5432", ConnState::Established, None),
            raw("[::ffff:10.0.0.2]:40002", "[::ffff:127.0.0.1]:80", ConnState::Established, None),
            raw("10.0.0.2:40003", "192.168.1.10:443", ConnState::TimeWait, None),
            raw("10.0.0.2:40004", "192.168.1.10:443", ConnState::Closed, None),
        ]);
        assert!(s.scan()?.connections.is_empty());
        Ok(())
    }

    #[test]
    fn test_drops_accepted_inbound_connections() -> Result<()> {
        let s = scanner(vec![
            raw("0.0.0.0:22", "0.0.0.0:0", ConnState::Listen, None),
            raw("10.0.0.2:22", "192.168.1.50:51515", ConnState::Established, None),
            raw("10.0.0.2:50000", "192.168.1.10:22", ConnState::Established, None),
        ]);
        let snapshot = s.scan()?;
        assert_eq!(snapshot.connections.len(), 1);
        assert_eq!(snapshot.connections[0].remote, addr("192.168.1.10:22"));
        Ok(())
    }

    #[test]
    fn test_attribution_degrades_without_failing() -> Result<()> {
        let s = scanner(vec![
            raw("10.0.0.2:50000", "192.168.1.10:443", ConnState::Established, Some(100)),
            raw("10.0.0.2:50001", "192.168.1.10:443", ConnState::Established, Some(200)),
            raw("10.0.0.2:50002", "192.168.1.10:443", ConnState::Established, None),
        ]);
        let snapshot = s.scan()?;
        let names: Vec<_> = snapshot
            .connections
            .iter()
            .map(|c| (c.pid, c.process_name.clone()))
            .collect();
        assert_eq!(
            names,
            vec![(Some(100), Some("curl".to_string())), (Some(200), None), (None, None)]
        );
        Ok(())
    }

    #[test]
    fn test_source_failure_is_scan_error() {
        let s = ConnectionScanner::new(Arc::new(FailingSource), Arc::new(Names), Attribution::Complete);
        assert!(matches!(s.scan(), Err(MonitorError::Scan(_))));
    }
}
