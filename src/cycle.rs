//! One reconciliation cycle end to end.
//!
//! A cycle is a single pipeline run triggered by an external scheduler:
//! fetch the four event legs and both chain heads concurrently, reconcile
//! each leg in both directions, age-classify and attribute the unmatched
//! confirmations, and assemble the report. Any transport error, malformed
//! log, or failed attribution aborts the whole cycle; the contract is one
//! consistent snapshot or a single failure, with no retries in the core.

use std::time::Duration;

use anyhow::anyhow;
use chrono::Utc;

use crate::{
    attribution::resolve_validators,
    client::{BridgeClient, BridgeEventKind, ChainSide},
    error::ReconcileError,
    events::{normalize, CanonicalEvent},
    misbehavior::classify,
    reconcile::{reconcile, ReconciliationResult},
    report::{build_direction_report, ReconciliationReport},
    settings::ReconcilerSettings,
    stats::{short_event_stats, ShortEventStats},
    watermark::{merge_unmatched, BridgeWatermarks},
};

/// Everything one cycle produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleOutput {
    /// The four unmatched sets, both legs in both directions.
    pub result: ReconciliationResult,
    /// Misbehavior report with attribution, per relay direction.
    pub report: ReconciliationReport,
    /// Count-level summary of the fetched batches.
    pub stats: ShortEventStats,
}

struct FetchedEvents {
    home_deposits: Vec<CanonicalEvent>,
    foreign_deposits: Vec<CanonicalEvent>,
    home_withdrawals: Vec<CanonicalEvent>,
    foreign_withdrawals: Vec<CanonicalEvent>,
    home_height: u64,
    foreign_height: u64,
}

/// Fetch and normalize one event leg, bounded by the cycle timeout.
pub(crate) async fn fetch_leg(
    client: &dyn BridgeClient,
    chain: ChainSide,
    kind: BridgeEventKind,
    from_block: u64,
    timeout: Duration,
) -> Result<Vec<CanonicalEvent>, ReconcileError> {
    let raw = tokio::time::timeout(timeout, client.fetch_events(kind, from_block))
        .await
        .map_err(|_| anyhow!("fetch timed out after {timeout:?}"))
        .and_then(|result| result)
        .map_err(|source| ReconcileError::Transport {
            chain,
            operation: format!("{kind} event fetch"),
            source,
        })?;

    tracing::debug!(
        %chain,
        event_kind = %kind,
        from_block,
        count = raw.len(),
        "Fetched bridge events"
    );

    raw.iter()
        .map(normalize)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ReconcileError::MalformedEvent {
            chain,
            kind,
            source,
        })
}

async fn fetch_height(
    client: &dyn BridgeClient,
    chain: ChainSide,
    timeout: Duration,
) -> Result<u64, ReconcileError> {
    tokio::time::timeout(timeout, client.chain_height())
        .await
        .map_err(|_| anyhow!("fetch timed out after {timeout:?}"))
        .and_then(|result| result)
        .map_err(|source| ReconcileError::Transport {
            chain,
            operation: "chain height lookup".to_string(),
            source,
        })
}

/// The four event fetches and two head lookups have no data dependency on
/// each other, so they are issued together and joined before reconciliation.
async fn fetch_all(
    home: &dyn BridgeClient,
    foreign: &dyn BridgeClient,
    settings: &ReconcilerSettings,
    home_from: u64,
    foreign_from: u64,
) -> Result<FetchedEvents, ReconcileError> {
    let timeout = settings.rpc_timeout;
    let withdrawal_kind = settings.bridge_mode.foreign_withdrawal_kind();

    let (
        home_deposits,
        foreign_deposits,
        home_withdrawals,
        foreign_withdrawals,
        home_height,
        foreign_height,
    ) = tokio::try_join!(
        fetch_leg(
            home,
            ChainSide::Home,
            BridgeEventKind::SignatureRequest,
            home_from,
            timeout,
        ),
        fetch_leg(
            foreign,
            ChainSide::Foreign,
            BridgeEventKind::RelayedMessage,
            foreign_from,
            timeout,
        ),
        fetch_leg(
            home,
            ChainSide::Home,
            BridgeEventKind::AffirmationCompleted,
            home_from,
            timeout,
        ),
        fetch_leg(foreign, ChainSide::Foreign, withdrawal_kind, foreign_from, timeout),
        fetch_height(home, ChainSide::Home, timeout),
        fetch_height(foreign, ChainSide::Foreign, timeout),
    )?;

    Ok(FetchedEvents {
        home_deposits,
        foreign_deposits,
        home_withdrawals,
        foreign_withdrawals,
        home_height,
        foreign_height,
    })
}

async fn build_output(
    home: &dyn BridgeClient,
    foreign: &dyn BridgeClient,
    settings: &ReconcilerSettings,
    fetched: &FetchedEvents,
) -> Result<CycleOutput, ReconcileError> {
    let only_in_home_deposits = reconcile(&fetched.home_deposits, &fetched.foreign_deposits);
    let only_in_foreign_deposits = reconcile(&fetched.foreign_deposits, &fetched.home_deposits);
    let only_in_home_withdrawals =
        reconcile(&fetched.home_withdrawals, &fetched.foreign_withdrawals);
    let only_in_foreign_withdrawals =
        reconcile(&fetched.foreign_withdrawals, &fetched.home_withdrawals);

    // A confirmation with no matching request implicates the validator that
    // submitted it: deposit confirmations live on the foreign side
    // (executeSignatures), withdrawal confirmations on the home side
    // (executeAffirmations). Ages are measured against the head of the chain
    // where the confirmation was observed.
    let x_signatures = &only_in_foreign_deposits;
    let x_affirmations = &only_in_home_withdrawals;

    let signature_misbehavior = classify(x_signatures, fetched.foreign_height);
    let affirmation_misbehavior = classify(x_affirmations, fetched.home_height);

    let signature_validators = resolve_validators(
        foreign,
        ChainSide::Foreign,
        x_signatures,
        settings.attribution_concurrency,
        settings.rpc_timeout,
    )
    .await?;
    let affirmation_validators = resolve_validators(
        home,
        ChainSide::Home,
        x_affirmations,
        settings.attribution_concurrency,
        settings.rpc_timeout,
    )
    .await?;

    let last_checked = Utc::now().timestamp();

    let report = ReconciliationReport {
        execute_signatures: build_direction_report(
            x_signatures,
            &signature_validators,
            signature_misbehavior,
        ),
        execute_affirmations: build_direction_report(
            x_affirmations,
            &affirmation_validators,
            affirmation_misbehavior,
        ),
        last_checked,
    };

    let stats = short_event_stats(
        &fetched.home_deposits,
        &fetched.foreign_deposits,
        &fetched.home_withdrawals,
        &fetched.foreign_withdrawals,
        None,
    );

    tracing::info!(
        unmatched_home_deposits = only_in_home_deposits.len(),
        unmatched_foreign_deposits = only_in_foreign_deposits.len(),
        unmatched_home_withdrawals = only_in_home_withdrawals.len(),
        unmatched_foreign_withdrawals = only_in_foreign_withdrawals.len(),
        "Reconciliation cycle complete"
    );

    Ok(CycleOutput {
        result: ReconciliationResult {
            only_in_home_deposits,
            only_in_foreign_deposits,
            only_in_home_withdrawals,
            only_in_foreign_withdrawals,
            last_checked,
        },
        report,
        stats,
    })
}

/// Run one full-history reconciliation cycle from the deployment blocks.
pub async fn run_cycle(
    home: &dyn BridgeClient,
    foreign: &dyn BridgeClient,
    settings: &ReconcilerSettings,
) -> Result<CycleOutput, ReconcileError> {
    let fetched = fetch_all(
        home,
        foreign,
        settings,
        settings.home_deployment_block,
        settings.foreign_deployment_block,
    )
    .await?;

    build_output(home, foreign, settings, &fetched).await
}

/// Run one incremental cycle starting from the supplied watermarks and
/// return the advanced state alongside the cycle output.
///
/// The watermark state is read here once and returned once; persisting it
/// and excluding concurrent cycles for the same chain pair are the caller's
/// job.
pub async fn run_incremental_cycle(
    home: &dyn BridgeClient,
    foreign: &dyn BridgeClient,
    settings: &ReconcilerSettings,
    watermarks: BridgeWatermarks,
) -> Result<(CycleOutput, BridgeWatermarks), ReconcileError> {
    let home_from = watermarks
        .home
        .processed_block
        .max(settings.home_deployment_block);
    let foreign_from = watermarks
        .foreign
        .processed_block
        .max(settings.foreign_deployment_block);

    let fetched = fetch_all(home, foreign, settings, home_from, foreign_from).await?;
    let output = build_output(home, foreign, settings, &fetched).await?;

    let BridgeWatermarks {
        home: mut home_mark,
        foreign: mut foreign_mark,
    } = watermarks;

    home_mark.deposit_count += fetched.home_deposits.len() as u64;
    home_mark.withdrawal_count += fetched.home_withdrawals.len() as u64;
    foreign_mark.deposit_count += fetched.foreign_deposits.len() as u64;
    foreign_mark.withdrawal_count += fetched.foreign_withdrawals.len() as u64;

    home_mark.unmatched_deposits = merge_unmatched(
        &home_mark.unmatched_deposits,
        &output.result.only_in_home_deposits,
        &fetched.foreign_deposits,
    );
    home_mark.unmatched_withdrawals = merge_unmatched(
        &home_mark.unmatched_withdrawals,
        &output.result.only_in_home_withdrawals,
        &fetched.foreign_withdrawals,
    );
    foreign_mark.unmatched_deposits = merge_unmatched(
        &foreign_mark.unmatched_deposits,
        &output.result.only_in_foreign_deposits,
        &fetched.home_deposits,
    );
    foreign_mark.unmatched_withdrawals = merge_unmatched(
        &foreign_mark.unmatched_withdrawals,
        &output.result.only_in_foreign_withdrawals,
        &fetched.home_withdrawals,
    );

    home_mark.advance(
        fetched
            .home_deposits
            .iter()
            .chain(&fetched.home_withdrawals)
            .map(|event| event.block_number),
    );
    foreign_mark.advance(
        fetched
            .foreign_deposits
            .iter()
            .chain(&fetched.foreign_withdrawals)
            .map(|event| event.block_number),
    );

    Ok((
        output,
        BridgeWatermarks {
            home: home_mark,
            foreign: foreign_mark,
        },
    ))
}
