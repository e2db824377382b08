use alloy::primitives::TxHash;
use thiserror::Error;

use crate::client::{BridgeEventKind, ChainSide};

/// A required field was absent from a raw log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("missing `{0}`")]
pub struct MissingField(pub &'static str);

/// Everything that can abort a reconciliation cycle.
///
/// All variants abort the cycle wholesale; there is no partial report. A
/// half-computed misbehavior classification could under-report severity, so
/// the contract is "one consistent snapshot or a single failure". Retries,
/// if any, belong to the scheduler.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// RPC or network failure reaching a chain.
    #[error("transport failure on {chain} chain during {operation}")]
    Transport {
        chain: ChainSide,
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// The normalizer received a log missing required fields.
    #[error("malformed {kind} event on {chain} chain: {source}")]
    MalformedEvent {
        chain: ChainSide,
        kind: BridgeEventKind,
        #[source]
        source: MissingField,
    },

    /// Transaction lookup for an unmatched event failed. Misattribution is
    /// worse than an absent report, so this is never papered over with a
    /// placeholder validator.
    #[error("failed to attribute unmatched event {tx_hash} on {chain} chain")]
    Attribution {
        chain: ChainSide,
        tx_hash: TxHash,
        #[source]
        source: anyhow::Error,
    },

    /// The caller supplied an unrecognized bridge mode.
    #[error("unrecognized bridge mode `{mode}`")]
    Config { mode: String },
}
