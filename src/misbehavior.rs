//! Block-age severity classification for unmatched events.
//!
//! Each unmatched event falls into exactly one of five age tiers relative to
//! the current chain head; the per-direction summary is an OR-reduction over
//! all events ("is there at least one unmatched event this old"). The tier
//! boundaries double as alert severity breakpoints downstream, so the
//! comparisons must stay exactly as written.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::events::CanonicalEvent;

/// Tier thresholds in blocks behind the chain head. The last one is roughly
/// a day at 5-second blocks.
const TIER_BOUNDS: [u64; 4] = [60, 180, 720, 17280];

/// Per-direction summary of unmatched-event ages, keyed the way the
/// original monitor reports them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisbehaviorRanges {
    #[serde(rename = "last60blocks")]
    pub last_60_blocks: bool,
    #[serde(rename = "last60to180blocks")]
    pub last_60_to_180_blocks: bool,
    #[serde(rename = "last180to720blocks")]
    pub last_180_to_720_blocks: bool,
    #[serde(rename = "last720to17280blocks")]
    pub last_720_to_17280_blocks: bool,
    #[serde(rename = "last17280blocks")]
    pub last_17280_blocks: bool,
}

impl MisbehaviorRanges {
    fn or(self, tiers: [bool; 5]) -> Self {
        Self {
            last_60_blocks: self.last_60_blocks || tiers[0],
            last_60_to_180_blocks: self.last_60_to_180_blocks || tiers[1],
            last_180_to_720_blocks: self.last_180_to_720_blocks || tiers[2],
            last_720_to_17280_blocks: self.last_720_to_17280_blocks || tiers[3],
            last_17280_blocks: self.last_17280_blocks || tiers[4],
        }
    }

    pub fn any(&self) -> bool {
        self.last_60_blocks
            || self.last_60_to_180_blocks
            || self.last_180_to_720_blocks
            || self.last_720_to_17280_blocks
            || self.last_17280_blocks
    }
}

/// Fold every unmatched event's one-hot tier membership into the
/// direction-level summary.
pub fn classify(unmatched: &[CanonicalEvent], chain_height: u64) -> MisbehaviorRanges {
    unmatched
        .iter()
        .map(|event| tier_membership(event.block_number, chain_height))
        .fold(MisbehaviorRanges::default(), MisbehaviorRanges::or)
}

/// One-hot tier membership for a single block number.
///
/// Arithmetic runs in `U256`: block heights fit 64 bits, but the threshold
/// subtraction must neither wrap nor lose precision near the extremes.
fn tier_membership(block_number: u64, chain_height: u64) -> [bool; 5] {
    let block = U256::from(block_number);
    let head = U256::from(chain_height);

    let minus_60 = head.saturating_sub(U256::from(TIER_BOUNDS[0]));
    let minus_180 = head.saturating_sub(U256::from(TIER_BOUNDS[1]));
    let minus_720 = head.saturating_sub(U256::from(TIER_BOUNDS[2]));
    let minus_17280 = head.saturating_sub(U256::from(TIER_BOUNDS[3]));

    [
        minus_60 <= block,
        minus_180 <= block && minus_60 > block,
        minus_720 <= block && minus_180 > block,
        minus_17280 <= block && minus_720 > block,
        minus_17280 > block,
    ]
}
