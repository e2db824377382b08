//! Validator set reconstruction from membership events.

use alloy::primitives::Address;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A decoded membership change from the bridge validator contract. The
/// caller collects these across contract versions; the fold below only cares
/// about ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum ValidatorEvent {
    ValidatorAdded { validator: Address, block_number: u64 },
    ValidatorRemoved { validator: Address, block_number: u64 },
}

impl ValidatorEvent {
    fn block_number(&self) -> u64 {
        match self {
            Self::ValidatorAdded { block_number, .. }
            | Self::ValidatorRemoved { block_number, .. } => *block_number,
        }
    }
}

/// Replay membership events in block order and return the surviving set,
/// preserving admission order. Re-adding a present validator is a no-op, as
/// is removing an absent one.
pub fn current_validator_set(events: impl IntoIterator<Item = ValidatorEvent>) -> Vec<Address> {
    let mut validators: Vec<Address> = Vec::new();

    for event in events
        .into_iter()
        .sorted_by_key(ValidatorEvent::block_number)
    {
        match event {
            ValidatorEvent::ValidatorAdded { validator, .. } => {
                if !validators.contains(&validator) {
                    validators.push(validator);
                }
            }
            ValidatorEvent::ValidatorRemoved { validator, .. } => {
                validators.retain(|member| *member != validator);
            }
        }
    }

    validators
}
