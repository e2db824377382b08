//! Short per-side event statistics.

use serde::{Deserialize, Serialize};

use crate::events::CanonicalEvent;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideStats {
    pub deposits: u64,
    pub withdrawals: u64,
    /// Signature threshold read off the validator contract by the caller;
    /// contract calls are not the core's business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_signatures: Option<u64>,
}

/// Count-level view of the bridge, cheap enough to publish every cycle.
/// Non-zero diffs are the first hint of a stalled relay before the full
/// reconciliation pinpoints the transfers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortEventStats {
    pub deposits_diff: i64,
    pub withdrawals_diff: i64,
    pub home: SideStats,
    pub foreign: SideStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_signatures_match: Option<bool>,
}

pub fn short_event_stats(
    home_deposits: &[CanonicalEvent],
    foreign_deposits: &[CanonicalEvent],
    home_withdrawals: &[CanonicalEvent],
    foreign_withdrawals: &[CanonicalEvent],
    required_signatures: Option<(u64, u64)>,
) -> ShortEventStats {
    ShortEventStats {
        deposits_diff: home_deposits.len() as i64 - foreign_deposits.len() as i64,
        withdrawals_diff: home_withdrawals.len() as i64 - foreign_withdrawals.len() as i64,
        home: SideStats {
            deposits: home_deposits.len() as u64,
            withdrawals: home_withdrawals.len() as u64,
            required_signatures: required_signatures.map(|(home, _)| home),
        },
        foreign: SideStats {
            deposits: foreign_deposits.len() as u64,
            withdrawals: foreign_withdrawals.len() as u64,
            required_signatures: required_signatures.map(|(_, foreign)| foreign),
        },
        required_signatures_match: required_signatures.map(|(home, foreign)| home == foreign),
    }
}
