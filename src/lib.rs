//! Cross-chain event reconciliation for two-chain token bridges.
//!
//! The crate watches a home/foreign bridge pair and detects relay failures:
//! transfer events emitted on one chain that were never mirrored on the
//! other. Raw logs come in through the [`BridgeClient`] seam, get normalized
//! into canonical records, reconciled as asymmetric set differences, aged
//! into misbehavior tiers, and attributed to the validators that submitted
//! them. The crate is an early-warning and audit tool for bridge operators;
//! it never submits transactions and never decides remediation.
//!
//! RPC connectivity, bridge-mode detection, persistence, and HTTP serving
//! are external collaborators; [`cycle::run_cycle`] consumes clients and
//! settings and returns a structured report.

pub mod attribution;
pub mod client;
pub mod cycle;
mod error;
pub mod events;
pub mod misbehavior;
pub mod reconcile;
pub mod report;
pub mod settings;
pub mod stats;
pub mod stuck_transfers;
#[cfg(test)]
pub mod test_utils;
pub mod validators;
pub mod watermark;

pub use client::{BridgeClient, BridgeEventKind, ChainSide};
pub use cycle::{run_cycle, run_incremental_cycle, CycleOutput};
pub use error::{MissingField, ReconcileError};
pub use events::{normalize, CanonicalEvent, RawBridgeLog};
pub use misbehavior::{classify, MisbehaviorRanges};
pub use reconcile::{reconcile, ReconciliationResult};
pub use report::{DirectionReport, ReconciliationReport, TransactionEntry};
pub use settings::{BridgeMode, ReconcilerSettings};
pub use stats::ShortEventStats;
pub use stuck_transfers::{run_stuck_transfers, StuckTransfersReport};
pub use validators::{current_validator_set, ValidatorEvent};
pub use watermark::{BridgeWatermarks, ChainWatermark};
