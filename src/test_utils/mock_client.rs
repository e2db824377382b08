use std::{collections::HashMap, sync::Arc};

use alloy::primitives::{Address, TxHash};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    client::{BridgeClient, BridgeEventKind},
    events::RawBridgeLog,
};

/// Mock chain for testing.
/// Allows deterministic control over event lists, chain height, and
/// transaction senders.
#[derive(Clone, Default)]
pub struct MockBridgeClient {
    height: Arc<RwLock<u64>>,
    events: Arc<RwLock<HashMap<BridgeEventKind, Vec<RawBridgeLog>>>>,
    senders: Arc<RwLock<HashMap<TxHash, Address>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockBridgeClient {
    /// Create a mock chain at the given head height.
    pub fn new(height: u64) -> Self {
        Self {
            height: Arc::new(RwLock::new(height)),
            ..Default::default()
        }
    }

    pub fn set_height(&self, height: u64) {
        *self.height.write() = height;
    }

    /// Append a raw log to the list returned for `kind`.
    pub fn push_event(&self, kind: BridgeEventKind, log: RawBridgeLog) {
        self.events.write().entry(kind).or_default().push(log);
    }

    /// Register the sender returned by `transaction_sender` for `tx_hash`.
    pub fn set_sender(&self, tx_hash: TxHash, sender: Address) {
        self.senders.write().insert(tx_hash, sender);
    }

    /// Make every request fail with a transport-style error.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write() = fail;
    }

    fn fail_if_configured(&self) -> Result<()> {
        if *self.should_fail.read() {
            Err(anyhow::anyhow!("mock client configured to fail"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BridgeClient for MockBridgeClient {
    async fn fetch_events(
        &self,
        kind: BridgeEventKind,
        from_block: u64,
    ) -> Result<Vec<RawBridgeLog>> {
        self.fail_if_configured()?;
        let events = self
            .events
            .read()
            .get(&kind)
            .map(|logs| {
                logs.iter()
                    .filter(|log| log.block_number.unwrap_or(0) >= from_block)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }

    async fn chain_height(&self) -> Result<u64> {
        self.fail_if_configured()?;
        Ok(*self.height.read())
    }

    async fn transaction_sender(&self, tx_hash: TxHash) -> Result<Address> {
        self.fail_if_configured()?;
        self.senders
            .read()
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no transaction {tx_hash}"))
    }
}
