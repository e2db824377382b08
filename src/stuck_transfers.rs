//! Detection of token transfers that never triggered the bridge callback.
//!
//! On erc-backed foreign sides the bridge is fed by ERC677 transfers: a
//! correct transfer emits both a plain `Transfer` log and a data-carrying one
//! in the same transaction. A plain transfer with no data-carrying sibling
//! means tokens landed in the bridge without the relay callback firing, and
//! they will sit there until someone intervenes.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    client::{BridgeClient, BridgeEventKind, ChainSide},
    cycle::fetch_leg,
    error::ReconcileError,
    events::CanonicalEvent,
    settings::ReconcilerSettings,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StuckTransfersReport {
    pub stuck_transfers: Vec<CanonicalEvent>,
    pub total: usize,
    pub last_checked: i64,
}

/// Plain transfers whose transaction emitted no data-carrying counterpart.
///
/// Both lists come from the same token contract, so the emitting transaction
/// hash is the join key here, not the economic-event key.
pub fn find_stuck_transfers(
    plain: &[CanonicalEvent],
    with_data: &[CanonicalEvent],
) -> Vec<CanonicalEvent> {
    plain
        .iter()
        .filter(|transfer| {
            !with_data
                .iter()
                .any(|candidate| candidate.tx_hash == transfer.tx_hash)
        })
        .cloned()
        .collect()
}

/// Fetch both transfer shapes from the foreign token contract and report the
/// stuck subset.
pub async fn run_stuck_transfers(
    foreign: &dyn BridgeClient,
    settings: &ReconcilerSettings,
) -> Result<StuckTransfersReport, ReconcileError> {
    let from_block = settings.foreign_deployment_block;
    let (plain, with_data) = tokio::try_join!(
        fetch_leg(
            foreign,
            ChainSide::Foreign,
            BridgeEventKind::TokenTransfer,
            from_block,
            settings.rpc_timeout,
        ),
        fetch_leg(
            foreign,
            ChainSide::Foreign,
            BridgeEventKind::TokenTransferWithData,
            from_block,
            settings.rpc_timeout,
        ),
    )?;

    let stuck_transfers = find_stuck_transfers(&plain, &with_data);
    tracing::debug!(
        plain = plain.len(),
        with_data = with_data.len(),
        stuck = stuck_transfers.len(),
        "Checked for stuck transfers"
    );

    Ok(StuckTransfersReport {
        total: stuck_transfers.len(),
        stuck_transfers,
        last_checked: Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::RawBridgeLog, test_utils::MockBridgeClient};
    use alloy::primitives::{Address, TxHash};
    use pretty_assertions::assert_eq;

    fn transfer(tx: u8, block_number: u64) -> CanonicalEvent {
        CanonicalEvent {
            tx_hash: TxHash::repeat_byte(tx),
            block_number,
            reference_tx: TxHash::repeat_byte(tx),
            recipient: Address::repeat_byte(0x01),
            value: "100".into(),
        }
    }

    #[test]
    fn transfer_with_data_sibling_is_not_stuck() {
        let plain = vec![transfer(0x01, 5), transfer(0x02, 6)];
        let with_data = vec![transfer(0x01, 5)];

        assert_eq!(find_stuck_transfers(&plain, &with_data), vec![transfer(0x02, 6)]);
    }

    #[test]
    fn all_stuck_when_no_data_transfers_exist() {
        let plain = vec![transfer(0x01, 5)];
        assert_eq!(find_stuck_transfers(&plain, &[]), plain);
    }

    #[tokio::test]
    async fn reports_stuck_subset_with_total() {
        let client = MockBridgeClient::new(100);
        for tx in [0x01, 0x02] {
            client.push_event(
                BridgeEventKind::TokenTransfer,
                RawBridgeLog {
                    transaction_hash: Some(TxHash::repeat_byte(tx)),
                    block_number: Some(10),
                    from: Some(Address::repeat_byte(0x02)),
                    value: Some("5".into()),
                    ..Default::default()
                },
            );
        }
        client.push_event(
            BridgeEventKind::TokenTransferWithData,
            RawBridgeLog {
                transaction_hash: Some(TxHash::repeat_byte(0x01)),
                block_number: Some(10),
                from: Some(Address::repeat_byte(0x02)),
                value: Some("5".into()),
                ..Default::default()
            },
        );

        let report = run_stuck_transfers(&client, &ReconcilerSettings::default())
            .await
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.stuck_transfers[0].tx_hash, TxHash::repeat_byte(0x02));
    }
}
