//! Asymmetric set difference between the two chains' event streams.

use serde::{Deserialize, Serialize};

use crate::events::CanonicalEvent;

/// The four unmatched sets one reconciliation cycle produces: each leg of the
/// bridge, reconciled independently in both directions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub only_in_home_deposits: Vec<CanonicalEvent>,
    pub only_in_foreign_deposits: Vec<CanonicalEvent>,
    pub only_in_home_withdrawals: Vec<CanonicalEvent>,
    pub only_in_foreign_withdrawals: Vec<CanonicalEvent>,
    /// Unix seconds when the cycle ran.
    pub last_checked: i64,
}

/// Source records with no counterpart on the destination side.
///
/// At-least-one-match semantics: duplicate destination records still satisfy
/// a source record, and are never flagged here. The pairwise scan is O(n·m),
/// which is fine for volumes bounded by on-chain bridge history polled at
/// long intervals.
pub fn reconcile(source: &[CanonicalEvent], dest: &[CanonicalEvent]) -> Vec<CanonicalEvent> {
    source
        .iter()
        .filter(|event| !dest.iter().any(|candidate| event.matches(candidate)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, TxHash};
    use pretty_assertions::assert_eq;

    fn event(reference: u8, recipient: u8, value: &str) -> CanonicalEvent {
        CanonicalEvent {
            tx_hash: TxHash::repeat_byte(reference ^ 0xf0),
            block_number: 10,
            reference_tx: TxHash::repeat_byte(reference),
            recipient: Address::repeat_byte(recipient),
            value: value.into(),
        }
    }

    #[test]
    fn balanced_sides_produce_no_unmatched() {
        let source = vec![event(0xaa, 0x01, "100")];
        let dest = vec![event(0xaa, 0x01, "100")];
        assert_eq!(reconcile(&source, &dest), vec![]);
    }

    #[test]
    fn missing_counterpart_is_unmatched() {
        let source = vec![event(0xaa, 0x01, "100"), event(0xbb, 0x02, "7")];
        let dest = vec![event(0xaa, 0x01, "100")];
        assert_eq!(reconcile(&source, &dest), vec![event(0xbb, 0x02, "7")]);
    }

    #[test]
    fn duplicate_destinations_still_match() {
        let source = vec![event(0xaa, 0x01, "100")];
        let dest = vec![event(0xaa, 0x01, "100"), event(0xaa, 0x01, "100")];
        assert_eq!(reconcile(&source, &dest), vec![]);
    }

    #[test]
    fn every_source_record_is_matched_or_unmatched_exactly_once() {
        let source = vec![
            event(0xaa, 0x01, "100"),
            event(0xbb, 0x02, "200"),
            event(0xcc, 0x03, "300"),
        ];
        let dest = vec![event(0xbb, 0x02, "200")];

        let unmatched = reconcile(&source, &dest);
        let matched: Vec<_> = source
            .iter()
            .filter(|e| !unmatched.contains(e))
            .cloned()
            .collect();

        assert_eq!(matched.len() + unmatched.len(), source.len());
        for record in &source {
            let in_matched = matched.contains(record);
            let in_unmatched = unmatched.contains(record);
            assert!(in_matched ^ in_unmatched);
        }
    }

    #[test]
    fn empty_destination_leaves_all_source_unmatched() {
        let source = vec![event(0xaa, 0x01, "100"), event(0xbb, 0x02, "200")];
        assert_eq!(reconcile(&source, &[]), source);
    }
}
