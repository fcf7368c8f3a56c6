use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::config::{ExclusionConfig, TargetRangeConfig};
use crate::error::{MonitorError, Result};

/// Parse a CIDR block or a bare address into a normalized prefix
///
/// Host bits are cleared (`192.168.1.7/24` becomes `192.168.1.0/24`) and a bare
/// address becomes a /32 or /128.
pub fn parse_range(s: &str) -> Result<IpNet> {
    let trimmed = s.trim();
    if trimmed.contains('/') {
        return IpNet::from_str(trimmed)
            .map(|net| net.trunc())
            .map_err(|e| MonitorError::Config(format!("Invalid IP range '{s}': {e}")));
    }

    let addr = IpAddr::from_str(trimmed)
        .map_err(|e| MonitorError::Config(format!("Invalid IP range '{s}': {e}")))?;
    let prefix_len = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    IpNet::new(addr, prefix_len)
        .map_err(|e| MonitorError::Config(format!("Invalid IP range '{s}': {e}")))
}

/// A monitored range with the label shown in alerts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetRange {
    network: IpNet,
    label: String,
}

impl TargetRange {
    pub fn new(network: IpNet, label: impl Into<String>) -> Self {
        Self { network, label: label.into() }
    }

    pub fn from_config(cfg: &TargetRangeConfig) -> Result<Self> {
        let network = parse_range(&cfg.range)?;
        let label = cfg
            .label
            .clone()
            .unwrap_or_else(|| network.to_string());
        Ok(Self { network, label })
    }

    pub fn network(&self) -> IpNet {
        self.network
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.network.contains(addr)
    }
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label == self.network.to_string() {
            write!(f, "{}", self.network)
        } else {
            write!(f, "{} ({})", self.label, self.network)
        }
    }
}

/// An address or range that never alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExclusionEntry {
    network: IpNet,
}

impl ExclusionEntry {
    pub fn new(network: IpNet) -> Self {
        Self { network }
    }

    pub fn from_config(cfg: &ExclusionConfig) -> Result<Self> {
        parse_range(&cfg.range).map(Self::new)
    }

    pub fn network(&self) -> IpNet {
        self.network
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.network.contains(addr)
    }
}
