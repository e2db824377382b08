//! Assembly of the final reconciliation report.

use std::collections::HashMap;

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::{events::CanonicalEvent, misbehavior::MisbehaviorRanges};

/// One transaction's entry in a direction report, keyed by the emitting
/// transaction hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    pub value: String,
    pub block: u64,
    pub reference_tx: TxHash,
    pub recipient: Address,
    /// The bridge validator whose transaction emitted the unmatched event.
    pub validator: Address,
}

/// Unmatched confirmations for one relay direction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionReport {
    pub misbehavior: MisbehaviorRanges,
    /// Emitting hash of the newest unmatched event. `None` when the bridge
    /// is balanced in this direction; the original monitor dereferenced the
    /// head of a sorted array here and would crash on an empty set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_recent_tx_hash: Option<TxHash>,
    pub transactions: HashMap<TxHash, TransactionEntry>,
}

/// The full per-cycle report handed to the persistence/serving collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Deposit-leg confirmations on the foreign chain with no home request.
    pub execute_signatures: DirectionReport,
    /// Withdrawal-leg confirmations on the home chain with no foreign request.
    pub execute_affirmations: DirectionReport,
    /// Unix seconds when the cycle ran.
    pub last_checked: i64,
}

/// Build one direction of the report from its unmatched set and the
/// index-correlated validator list produced by attribution.
pub fn build_direction_report(
    unmatched: &[CanonicalEvent],
    validators: &[Address],
    misbehavior: MisbehaviorRanges,
) -> DirectionReport {
    debug_assert_eq!(unmatched.len(), validators.len());

    // Ties on block number resolve to the later record, i.e. the last entry
    // of a stable ascending sort.
    let most_recent_tx_hash = unmatched
        .iter()
        .max_by_key(|event| event.block_number)
        .map(|event| event.tx_hash);

    let transactions = unmatched
        .iter()
        .zip(validators)
        .map(|(event, validator)| {
            (
                event.tx_hash,
                TransactionEntry {
                    value: event.value.clone(),
                    block: event.block_number,
                    reference_tx: event.reference_tx,
                    recipient: event.recipient,
                    validator: *validator,
                },
            )
        })
        .collect();

    DirectionReport {
        misbehavior,
        most_recent_tx_hash,
        transactions,
    }
}
