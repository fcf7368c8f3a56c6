use std::net::IpAddr;

use super::range::{ExclusionEntry, TargetRange};
use crate::config::{ExclusionConfig, TargetRangeConfig};
use crate::error::Result;

/// Result of checking a remote address against the configured ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    NoMatch,
    Matched(&'a TargetRange),
    Excluded,
}

impl MatchOutcome<'_> {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }
}

/// Classifies remote addresses against target ranges and exclusions
///
/// Built once at startup; every entry is parsed up front so a bad range fails
/// the whole construction instead of producing a partial matcher.
#[derive(Debug, Clone)]
pub struct RangeMatcher {
    targets: Vec<TargetRange>,
    exclusions: Vec<ExclusionEntry>,
}

impl RangeMatcher {
    pub fn new(targets: Vec<TargetRange>, exclusions: Vec<ExclusionEntry>) -> Self {
        Self { targets, exclusions }
    }

    pub fn from_config(targets: &[TargetRangeConfig], exclusions: &[ExclusionConfig]) -> Result<Self> {
        let targets = targets
            .iter()
            .map(TargetRange::from_config)
            .collect::<Result<Vec<_>>>()?;
        let exclusions = exclusions
            .iter()
            .map(ExclusionEntry::from_config)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { targets, exclusions })
    }

    /// Classify a remote address
    ///
    /// # Logic:
    /// - Any exclusion containing the address: `Excluded`
    /// - Otherwise the first target (in configured order) containing it: `Matched`
    /// - Otherwise: `NoMatch`
    ///
    /// IPv4-mapped IPv6 addresses are checked as their IPv4 form.
    pub fn classify(&self, addr: IpAddr) -> MatchOutcome<'_> {
        let addr = addr.to_canonical();

        if self.exclusions.iter().any(|ex| ex.contains(&addr)) {
            return MatchOutcome::Excluded;
        }

        self.targets
            .iter()
            .find(|target| target.contains(&addr))
            .map_or(MatchOutcome::NoMatch, MatchOutcome::Matched)
    }

    pub fn targets(&self) -> &[TargetRange] {
        &self.targets
    }

    pub fn exclusions(&self) -> &[ExclusionEntry] {
        &self.exclusions
    }
}
