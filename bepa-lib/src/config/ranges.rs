use serde::Deserialize;

/// A range whose use triggers an alert
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TargetRangeConfig {
    /// CIDR block or single address
    /// Example: "192.168.0.0/16", "10.0.0.5", "fd00::/8"
    pub range: String,
    /// Human-readable name shown in alerts
    /// Default: the normalized CIDR of `range`
    #[serde(default)]
    pub label: Option<String>,
}

impl TargetRangeConfig {
    pub fn new(range: impl Into<String>) -> Self {
        Self { range: range.into(), label: None }
    }

    pub fn labeled(range: impl Into<String>, label: impl Into<String>) -> Self {
        Self { range: range.into(), label: Some(label.into()) }
    }
}

/// An address or range exempted from alerting
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExclusionConfig {
    /// CIDR block or single address, applied to the remote address
    pub range: String,
}

impl ExclusionConfig {
    pub fn new(range: impl Into<String>) -> Self {
        Self { range: range.into() }
    }
}
