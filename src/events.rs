//! Normalization of heterogeneous bridge logs into a canonical record.
//!
//! The bridge contracts emit at least four log shapes (signature request,
//! relayed message, affirmation, plain token transfer). They differ in where
//! the cross-chain reference and the recipient live, so everything downstream
//! works on [`CanonicalEvent`] instead. Normalization is driven purely by
//! field presence, never by event kind.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::error::MissingField;

/// A decoded bridge log as delivered by a [`crate::BridgeClient`].
///
/// Fields are optional because the shapes differ: a relay confirmation
/// carries the originating transaction hash in its payload, a plain ERC20
/// transfer carries `from` instead of `recipient`, and a malformed or pruned
/// log may lack its envelope fields entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBridgeLog {
    /// Hash of the transaction that emitted this log.
    pub transaction_hash: Option<TxHash>,
    /// Block containing the log.
    pub block_number: Option<u64>,
    /// Originating cross-chain transaction referenced by the payload, when
    /// the event is a relay confirmation.
    pub reference_tx: Option<TxHash>,
    /// Destination address from the payload.
    pub recipient: Option<Address>,
    /// Transfer sender, present on plain-token-transfer-shaped logs.
    pub from: Option<Address>,
    /// Transfer amount as a decimal string.
    pub value: Option<String>,
}

/// The canonical form every raw log is reduced to.
///
/// `value` stays a decimal string end to end: amounts routinely exceed the
/// safe integer range and the equality key is exact string equality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Identity of the emission itself, not of the referenced transfer.
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Hash of the originating transaction this event refers to. Equals
    /// `tx_hash` when the event *is* the originating one.
    pub reference_tx: TxHash,
    pub recipient: Address,
    pub value: String,
}

impl CanonicalEvent {
    /// Whether two records describe the same economic event.
    ///
    /// The same transfer has different transaction identities on each chain,
    /// so `tx_hash` and `block_number` are deliberately not part of the key.
    pub fn matches(&self, other: &CanonicalEvent) -> bool {
        self.reference_tx == other.reference_tx
            && self.recipient == other.recipient
            && self.value == other.value
    }
}

/// Map a raw log into its canonical record.
///
/// Pure, no event-kind branching: `reference_tx` falls back to the emitting
/// transaction hash, `recipient` falls back to the transfer's `from`. Logs
/// missing their envelope or amount are rejected rather than guessed at.
pub fn normalize(log: &RawBridgeLog) -> Result<CanonicalEvent, MissingField> {
    let tx_hash = log.transaction_hash.ok_or(MissingField("transactionHash"))?;
    let block_number = log.block_number.ok_or(MissingField("blockNumber"))?;
    let recipient = log
        .recipient
        .or(log.from)
        .ok_or(MissingField("recipient"))?;
    let value = log.value.clone().ok_or(MissingField("value"))?;

    Ok(CanonicalEvent {
        tx_hash,
        block_number,
        reference_tx: log.reference_tx.unwrap_or(tx_hash),
        recipient,
        value,
    })
}
