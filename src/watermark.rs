//! Incremental scan watermarks.
//!
//! In incremental mode each cycle fetches only blocks past the previous
//! cycle's watermark, so RPC cost tracks new activity instead of full bridge
//! history. The state is externally owned: the caller reads it before a cycle,
//! hands it in, and persists whatever comes back. The core never keeps it in a
//! process-global, and concurrent cycles for the same chain pair are the
//! caller's responsibility to exclude.

use serde::{Deserialize, Serialize};

use crate::events::CanonicalEvent;

/// Cumulative scan state for one chain side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainWatermark {
    /// Next block to scan. Monotonically non-decreasing.
    pub processed_block: u64,
    pub deposit_count: u64,
    pub withdrawal_count: u64,
    pub unmatched_deposits: Vec<CanonicalEvent>,
    pub unmatched_withdrawals: Vec<CanonicalEvent>,
}

impl ChainWatermark {
    /// Advance past the highest block seen in this cycle's fetched batches.
    /// A cycle that fetched nothing leaves the watermark untouched.
    pub fn advance(&mut self, seen_blocks: impl IntoIterator<Item = u64>) {
        if let Some(highest) = seen_blocks.into_iter().max() {
            self.processed_block = self.processed_block.max(highest + 1);
        }
    }
}

/// Both sides' watermarks, stored together under stable keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeWatermarks {
    pub home: ChainWatermark,
    pub foreign: ChainWatermark,
}

/// Merge a cycle's fresh unmatched records into the cumulative list.
///
/// Previously recorded entries are re-validated against the destination
/// records fetched this cycle: a transfer that was unmatched in cycle N but
/// relayed in cycle N+1 finds its counterpart in the new batch and is
/// dropped. (The original monitor appended blindly and listed such transfers
/// as unmatched forever.)
pub fn merge_unmatched(
    existing: &[CanonicalEvent],
    fresh: &[CanonicalEvent],
    dest_batch: &[CanonicalEvent],
) -> Vec<CanonicalEvent> {
    let mut merged: Vec<CanonicalEvent> = existing
        .iter()
        .filter(|event| !dest_batch.iter().any(|candidate| event.matches(candidate)))
        .cloned()
        .collect();

    let dropped = existing.len() - merged.len();
    if dropped > 0 {
        tracing::info!(dropped, "Late-relayed transfers left the unmatched list");
    }

    merged.extend_from_slice(fresh);
    merged
}
