use netstat2::{get_sockets_info, AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState};
use std::net::SocketAddr;

use super::connection::{ConnState, Protocol, RawConnection};
use crate::error::{MonitorError, Result};

/// The OS connection listing
///
/// Implementations return every socket they can see, listening ones included;
/// filtering down to outgoing connections happens in the scanner. A socket
/// whose owner cannot be determined is returned with `pid: None`.
pub trait ConnectionSource: Send + Sync {
    fn list(&self) -> Result<Vec<RawConnection>>;
}

/// Connection listing backed by `netstat2` (procfs/netlink on Linux, sysctl on macOS)
#[derive(Debug, Clone, Copy, Default)]
pub struct NetstatSource;

impl ConnectionSource for NetstatSource {
    fn list(&self) -> Result<Vec<RawConnection>> {
        let af_flags = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
        let sockets = get_sockets_info(af_flags, ProtocolFlags::TCP)
            .map_err(|e| MonitorError::Scan(format!("Failed to list sockets: {e}")))?;

        let raw = sockets
            .into_iter()
            .filter_map(|si| {
                let pid = si.associated_pids.first().copied();
                match si.protocol_socket_info {
                    ProtocolSocketInfo::Tcp(tcp) => Some(RawConnection {
                        local: SocketAddr::new(tcp.local_addr, tcp.local_port),
                        remote: SocketAddr::new(tcp.remote_addr, tcp.remote_port),
                        protocol: Protocol::Tcp,
                        state: tcp.state.into(),
                        pid,
                    }),
                    // UDP sockets carry no remote peer.
                    ProtocolSocketInfo::Udp(_) => None,
                }
            })
            .collect();

        Ok(raw)
    }
}

impl From<TcpState> for ConnState {
    fn from(state: TcpState) -> Self {
        match state {
            TcpState::Closed => ConnState::Closed,
            TcpState::Listen => ConnState::Listen,
            TcpState::SynSent => ConnState::SynSent,
            TcpState::SynReceived => ConnState::SynReceived,
            TcpState::Established => ConnState::Established,
            TcpState::FinWait1 => ConnState::FinWait1,
            TcpState::FinWait2 => ConnState::FinWait2,
            TcpState::CloseWait => ConnState::CloseWait,
            TcpState::Closing => ConnState::Closing,
            TcpState::LastAck => ConnState::LastAck,
            TcpState::TimeWait => ConnState::TimeWait,
            TcpState::DeleteTcb => ConnState::DeleteTcb,
            TcpState::Unknown => ConnState::Unknown,
        }
    }
}
