use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::events::RawBridgeLog;

/// Which side of the bridge pair an operation targets.
///
/// "Home" is conventionally the origin chain, "foreign" the destination.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChainSide {
    Home,
    Foreign,
}

/// The raw log shapes the bridge contracts emit.
///
/// The caller picks the kind per leg and per chain; the normalizer never
/// branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum BridgeEventKind {
    /// `UserRequestForSignature` on the home bridge (deposit request).
    SignatureRequest,
    /// `RelayedMessage` on the foreign bridge (deposit confirmation).
    RelayedMessage,
    /// `AffirmationCompleted` on the home bridge (withdrawal confirmation).
    AffirmationCompleted,
    /// `UserRequestForAffirmation` on the foreign bridge (withdrawal request,
    /// native-to-erc mode).
    AffirmationRequest,
    /// Plain ERC20 `Transfer` into the foreign bridge (withdrawal request,
    /// erc-to-erc and erc-to-native modes).
    TokenTransfer,
    /// ERC677 `Transfer` with a data payload, emitted alongside the plain
    /// transfer when the bridge callback fired. Only used for stuck-transfer
    /// detection.
    TokenTransferWithData,
}

/// Read-only access to one chain of the bridge pair.
///
/// Implementations own RPC connectivity, ABI resolution, and log decoding;
/// the reconciliation core only consumes decoded logs and chain metadata
/// through this seam.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// All bridge logs of `kind` from `from_block` to the chain head.
    async fn fetch_events(
        &self,
        kind: BridgeEventKind,
        from_block: u64,
    ) -> anyhow::Result<Vec<RawBridgeLog>>;

    /// Current chain head height.
    async fn chain_height(&self) -> anyhow::Result<u64>;

    /// Sender address of the transaction `tx_hash`, used to attribute an
    /// unmatched confirmation to the validator that submitted it.
    async fn transaction_sender(&self, tx_hash: TxHash) -> anyhow::Result<Address>;
}
