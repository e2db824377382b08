//! Attribution of unmatched events to the validators that submitted them.

use std::time::Duration;

use alloy::primitives::Address;
use anyhow::anyhow;
use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    client::{BridgeClient, ChainSide},
    error::ReconcileError,
    events::CanonicalEvent,
};

/// Resolve the sender of every unmatched event's emitting transaction on the
/// chain where it was observed.
///
/// Lookups run concurrently up to `concurrency`, but `buffered` keeps results
/// index-correlated with `unmatched`, so `result[i]` is always the validator
/// for `unmatched[i]`. Any failed or timed-out lookup aborts the batch: a
/// node that pruned the transaction must fail the cycle rather than yield a
/// placeholder validator.
pub async fn resolve_validators(
    client: &dyn BridgeClient,
    chain: ChainSide,
    unmatched: &[CanonicalEvent],
    concurrency: usize,
    timeout: Duration,
) -> Result<Vec<Address>, ReconcileError> {
    let validators = stream::iter(unmatched.iter().map(|event| {
        let tx_hash = event.tx_hash;
        async move {
            tokio::time::timeout(timeout, client.transaction_sender(tx_hash))
                .await
                .map_err(|_| anyhow!("transaction lookup timed out"))
                .and_then(|result| result)
                .map_err(|source| ReconcileError::Attribution {
                    chain,
                    tx_hash,
                    source,
                })
        }
    }))
    .buffered(concurrency.max(1))
    .try_collect::<Vec<_>>()
    .await?;

    tracing::debug!(
        %chain,
        resolved = validators.len(),
        "Attributed unmatched events to validators"
    );

    Ok(validators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBridgeClient;
    use alloy::primitives::TxHash;
    use pretty_assertions::assert_eq;

    fn event_with_tx(byte: u8) -> CanonicalEvent {
        CanonicalEvent {
            tx_hash: TxHash::repeat_byte(byte),
            block_number: 10,
            reference_tx: TxHash::repeat_byte(byte),
            recipient: Address::repeat_byte(0x01),
            value: "100".into(),
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn results_stay_aligned_with_their_events() {
        let client = MockBridgeClient::new(100);
        client.set_sender(TxHash::repeat_byte(0x01), Address::repeat_byte(0xa1));
        client.set_sender(TxHash::repeat_byte(0x02), Address::repeat_byte(0xa2));
        client.set_sender(TxHash::repeat_byte(0x03), Address::repeat_byte(0xa3));

        let unmatched = vec![event_with_tx(0x03), event_with_tx(0x01), event_with_tx(0x02)];
        let validators = resolve_validators(&client, ChainSide::Foreign, &unmatched, 2, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(
            validators,
            vec![
                Address::repeat_byte(0xa3),
                Address::repeat_byte(0xa1),
                Address::repeat_byte(0xa2),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_transaction_fails_the_batch() {
        let client = MockBridgeClient::new(100);
        client.set_sender(TxHash::repeat_byte(0x01), Address::repeat_byte(0xa1));

        let unmatched = vec![event_with_tx(0x01), event_with_tx(0x02)];
        let err = resolve_validators(&client, ChainSide::Home, &unmatched, 4, TIMEOUT)
            .await
            .unwrap_err();

        match err {
            ReconcileError::Attribution { chain, tx_hash, .. } => {
                assert_eq!(chain, ChainSide::Home);
                assert_eq!(tx_hash, TxHash::repeat_byte(0x02));
            }
            other => panic!("expected Attribution error, got {other}"),
        }
    }

    #[tokio::test]
    async fn empty_batch_resolves_to_nothing() {
        let client = MockBridgeClient::new(100);
        let validators = resolve_validators(&client, ChainSide::Home, &[], 4, TIMEOUT)
            .await
            .unwrap();
        assert!(validators.is_empty());
    }
}
