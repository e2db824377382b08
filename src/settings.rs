use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{client::BridgeEventKind, error::ReconcileError};

/// Which contract family the bridge pair runs.
///
/// Resolved once at startup by the mode-detection collaborator (it reads
/// `getBridgeMode()` off the home contract) and passed into the core; the
/// core itself never re-detects it. The mode decides which event shape
/// represents the withdrawal request on the foreign side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeMode {
    NativeToErc,
    ErcToErc,
    ErcToNative,
}

impl BridgeMode {
    /// Parse the mode string the detection collaborator reports.
    pub fn from_mode_str(mode: &str) -> Result<Self, ReconcileError> {
        match mode {
            "NATIVE_TO_ERC" => Ok(Self::NativeToErc),
            "ERC_TO_ERC" => Ok(Self::ErcToErc),
            "ERC_TO_NATIVE" => Ok(Self::ErcToNative),
            other => Err(ReconcileError::Config {
                mode: other.to_string(),
            }),
        }
    }

    /// Erc-backed foreign sides signal withdrawal requests with plain token
    /// transfers into the bridge instead of `UserRequestForAffirmation`.
    pub fn has_foreign_erc(self) -> bool {
        matches!(self, Self::ErcToErc | Self::ErcToNative)
    }

    pub fn foreign_withdrawal_kind(self) -> BridgeEventKind {
        if self.has_foreign_erc() {
            BridgeEventKind::TokenTransfer
        } else {
            BridgeEventKind::AffirmationRequest
        }
    }
}

/// Per-run configuration for the reconciliation core.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerSettings {
    pub bridge_mode: BridgeMode,
    /// First block to scan on each side in full-history mode. Incremental
    /// mode starts from the watermark instead.
    pub home_deployment_block: u64,
    pub foreign_deployment_block: u64,
    /// Upper bound on every external fetch. A timeout aborts the cycle.
    #[serde(default = "default_rpc_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub rpc_timeout: Duration,
    /// Concurrent in-flight attribution lookups, bounded to avoid
    /// overwhelming the RPC endpoint.
    #[serde(default = "default_attribution_concurrency")]
    pub attribution_concurrency: usize,
}

fn default_rpc_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_attribution_concurrency() -> usize {
    25
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            bridge_mode: BridgeMode::NativeToErc,
            home_deployment_block: 0,
            foreign_deployment_block: 0,
            rpc_timeout: default_rpc_timeout(),
            attribution_concurrency: default_attribution_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("NATIVE_TO_ERC", BridgeMode::NativeToErc)]
    #[case("ERC_TO_ERC", BridgeMode::ErcToErc)]
    #[case("ERC_TO_NATIVE", BridgeMode::ErcToNative)]
    fn known_modes_parse(#[case] raw: &str, #[case] expected: BridgeMode) {
        assert_eq!(BridgeMode::from_mode_str(raw).unwrap(), expected);
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let err = BridgeMode::from_mode_str("AMB").unwrap_err();
        assert!(matches!(err, ReconcileError::Config { mode } if mode == "AMB"));
    }

    #[rstest]
    #[case(BridgeMode::NativeToErc, BridgeEventKind::AffirmationRequest)]
    #[case(BridgeMode::ErcToErc, BridgeEventKind::TokenTransfer)]
    #[case(BridgeMode::ErcToNative, BridgeEventKind::TokenTransfer)]
    fn withdrawal_kind_follows_mode(#[case] mode: BridgeMode, #[case] kind: BridgeEventKind) {
        assert_eq!(mode.foreign_withdrawal_kind(), kind);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: ReconcilerSettings = serde_json::from_value(serde_json::json!({
            "bridge_mode": "ERC_TO_NATIVE",
            "home_deployment_block": 7,
        }))
        .unwrap();

        assert_eq!(settings.bridge_mode, BridgeMode::ErcToNative);
        assert_eq!(settings.home_deployment_block, 7);
        assert_eq!(settings.foreign_deployment_block, 0);
        assert_eq!(settings.rpc_timeout, Duration::from_secs(30));
        assert_eq!(settings.attribution_concurrency, 25);
    }
}
