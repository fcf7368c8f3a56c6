mod classify;
mod range;

pub use classify::{MatchOutcome, RangeMatcher};
pub use range::{parse_range, ExclusionEntry, TargetRange};
