//! Integration tests exercising a full distribution run:
//! funding → generation → persistence → transfers → reconciliation.
//!
//! The orchestrator is wired to the nullable ledger and store so every
//! checkpoint can be inspected and time can be paused.

use std::time::Duration;

use fanout_crypto::keypair_from_seed;
use fanout_distributor::{
    ControllingAccount, DistributionOutcome, DistributionPlan, Distributor, DistributorConfig,
    DistributorError, FundingOutcome, SeededAccountFactory, TransferPipeline, TransferSummary,
    ABANDONED_AT_DEADLINE,
};
use fanout_nullables::{AirdropBehavior, LedgerCall, NullBatchStore, NullLedger, TransferBehavior};
use fanout_store::{BatchStore, JsonFileStore};
use fanout_types::Lamports;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sol(tokens: f64) -> Lamports {
    Lamports::from_sol(tokens).expect("valid amount")
}

fn controller() -> ControllingAccount {
    ControllingAccount::from_keypair(keypair_from_seed(&[42u8; 32]))
}

fn distributor(
    ledger: NullLedger,
    store: NullBatchStore,
) -> Distributor<NullLedger, NullBatchStore, SeededAccountFactory> {
    Distributor::new(
        ledger,
        store,
        SeededAccountFactory::new(1),
        DistributorConfig::default(),
    )
}

fn funded_ledger(balance: f64) -> NullLedger {
    let ledger = NullLedger::new();
    ledger.set_balance(controller().address(), sol(balance));
    ledger
}

// ---------------------------------------------------------------------------
// 1. Transfer phase
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn second_transfer_hangs_past_its_deadline() {
    let ledger = funded_ledger(1.5);
    ledger.script_transfers([
        TransferBehavior::Succeed,
        TransferBehavior::Hang,
        TransferBehavior::Succeed,
    ]);
    let d = distributor(ledger, NullBatchStore::new());
    let plan = DistributionPlan::parse("3", "0.4").unwrap();

    let report = d.distribute(&controller(), &plan).await.unwrap();

    assert_eq!(report.outcome, DistributionOutcome::Completed);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.funding, FundingOutcome::Sufficient { balance: sol(1.5) });

    let stored = d.store().latest().unwrap();
    assert_eq!(stored.len(), 3);
    let records = stored.records();
    assert!(records[0].transfer_success);
    assert_eq!(records[0].amount, sol(0.4));
    assert!(!records[1].transfer_success);
    assert_eq!(records[1].amount, Lamports::ZERO);
    assert!(records[2].transfer_success);
    assert_eq!(records[2].amount, sol(0.4));
    assert_eq!(stored, report.batch);
}

#[tokio::test(start_paused = true)]
async fn generated_batch_is_persisted_before_any_transfer() {
    let d = distributor(funded_ledger(5.0), NullBatchStore::new());
    let plan = DistributionPlan::parse("4", "0.1").unwrap();

    d.distribute(&controller(), &plan).await.unwrap();

    let snapshots = d.store().snapshots();
    // one snapshot after generation, one per transfer outcome
    assert_eq!(snapshots.len(), 5);
    let initial = &snapshots[0];
    assert_eq!(initial.len(), 4);
    assert!(initial
        .iter()
        .all(|r| r.amount == Lamports::ZERO && !r.transfer_success && !r.attempted()));
    for (k, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(snapshot.iter().filter(|r| r.attempted()).count(), k);
    }
}

#[tokio::test(start_paused = true)]
async fn transfers_never_overlap() {
    let ledger = funded_ledger(5.0);
    ledger.script_transfers([
        TransferBehavior::Delay(Duration::from_secs(3)),
        TransferBehavior::Hang,
        TransferBehavior::Delay(Duration::from_secs(1)),
    ]);
    let d = distributor(ledger, NullBatchStore::new());
    let plan = DistributionPlan::parse("3", "0.2").unwrap();

    let report = d.distribute(&controller(), &plan).await.unwrap();

    assert_eq!(d.client().max_concurrent_transfers(), 1);
    let order: Vec<_> = report.batch.iter().map(|r| r.address.clone()).collect();
    assert_eq!(d.client().transfer_targets(), order);
}

#[tokio::test(start_paused = true)]
async fn global_deadline_aborts_with_exit_code_one() {
    let ledger = funded_ledger(5.0);
    ledger.script_transfers([
        TransferBehavior::Delay(Duration::from_secs(25)),
        TransferBehavior::Hang,
        TransferBehavior::Hang,
    ]);
    let d = distributor(ledger, NullBatchStore::new());
    let plan = DistributionPlan::parse("3", "0.4").unwrap();

    let start = tokio::time::Instant::now();
    let report = d.distribute(&controller(), &plan).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert_eq!(report.outcome, DistributionOutcome::GlobalDeadlineExceeded);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.summary.attempted, 3);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 2);

    let stored = d.store().latest().unwrap();
    let records = stored.records();
    assert!(records[0].transfer_success);
    assert!(!records[1].transfer_success);
    assert!(records[1].failure.is_some());
    // the transfer cut off by the deadline is recorded, not left looking untouched
    assert!(records[2].attempted());
    assert!(!records[2].transfer_success);
    assert_eq!(records[2].failure.as_deref(), Some(ABANDONED_AT_DEADLINE));
    assert_eq!(stored, report.batch);

    // generation, two per-transfer checkpoints, then the final save
    assert_eq!(d.store().snapshot_bytes().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn transfer_cut_off_by_global_deadline_is_never_resent() {
    let ledger = funded_ledger(5.0);
    ledger.script_transfers([
        TransferBehavior::Delay(Duration::from_secs(25)),
        TransferBehavior::Hang,
        TransferBehavior::LandThenHang,
    ]);
    let d = distributor(ledger, NullBatchStore::new());
    let plan = DistributionPlan::parse("3", "0.4").unwrap();

    let report = d.distribute(&controller(), &plan).await.unwrap();
    assert_eq!(report.outcome, DistributionOutcome::GlobalDeadlineExceeded);

    // the third transfer landed even though its confirmation was abandoned
    let third = report.batch.get(2).unwrap().address.clone();
    assert_eq!(d.client().balance_of(&third), sol(0.4));

    // running the pipeline again over the stored batch sends nothing more
    let mut stored = d.store().latest().unwrap();
    let pipeline = TransferPipeline::new(d.client(), d.store(), Duration::from_secs(30));
    let mut summary = TransferSummary::default();
    pipeline
        .run(&controller(), &mut stored, plan.amount_per_account(), &mut summary)
        .await;

    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.skipped, 3);
    let sends_to_third = d
        .client()
        .transfer_targets()
        .iter()
        .filter(|a| **a == third)
        .count();
    assert_eq!(sends_to_third, 1);
    assert_eq!(d.client().balance_of(&third), sol(0.4));
}

#[tokio::test(start_paused = true)]
async fn persistence_failures_do_not_stop_the_run() {
    let store = NullBatchStore::new();
    store.set_fail_writes(true);
    let d = distributor(funded_ledger(5.0), store);
    let plan = DistributionPlan::parse("2", "0.5").unwrap();

    let report = d.distribute(&controller(), &plan).await.unwrap();

    assert_eq!(report.summary.succeeded, 2);
    // generation save + two checkpoints
    assert_eq!(report.summary.checkpoint_failures, 3);
    assert_eq!(d.store().failed_write_count(), 3);
}

// ---------------------------------------------------------------------------
// 2. Funding
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn failed_faucet_still_runs_the_pipeline() {
    let ledger = funded_ledger(0.05);
    ledger.set_airdrop(AirdropBehavior::Fail("faucet dry".into()));
    let d = distributor(ledger, NullBatchStore::new());
    let plan = DistributionPlan::parse("2", "0.4").unwrap();

    let report = d.distribute(&controller(), &plan).await.unwrap();

    assert!(matches!(report.funding, FundingOutcome::AirdropFailed { .. }));
    assert_eq!(report.summary.failed, 2);
    assert!(!report.summary.failure_hints().is_empty());
    assert!(report
        .batch
        .iter()
        .all(|r| r.failure.as_deref().is_some_and(|f| f.contains("insufficient"))));

    let calls = d.client().calls();
    let airdrop_at = calls
        .iter()
        .position(|c| matches!(c, LedgerCall::Airdrop(..)))
        .expect("airdrop requested");
    let first_transfer_at = calls
        .iter()
        .position(|c| matches!(c, LedgerCall::Transfer { .. }))
        .expect("transfers attempted");
    assert!(airdrop_at < first_transfer_at);
}

#[tokio::test(start_paused = true)]
async fn faucet_credit_funds_the_transfers() {
    let d = distributor(funded_ledger(0.05), NullBatchStore::new());
    let plan = DistributionPlan::parse("3", "0.4").unwrap();

    let report = d.distribute(&controller(), &plan).await.unwrap();

    assert!(matches!(
        report.funding,
        FundingOutcome::Airdropped { after: Some(_), .. }
    ));
    assert_eq!(report.summary.succeeded, 3);
    assert_eq!(d.client().balance_of(controller().address()), sol(0.85));
}

#[tokio::test(start_paused = true)]
async fn invalid_funding_config_aborts_before_persisting() {
    let config = DistributorConfig {
        airdrop_amount: 0.0,
        ..DistributorConfig::default()
    };
    let d = Distributor::new(
        funded_ledger(1.0),
        NullBatchStore::new(),
        SeededAccountFactory::new(1),
        config,
    );
    let plan = DistributionPlan::parse("1", "0.1").unwrap();

    let result = d.distribute(&controller(), &plan).await;

    assert!(matches!(result, Err(DistributorError::Config(_))));
    assert_eq!(d.store().write_count(), 0);
}

// ---------------------------------------------------------------------------
// 3. Reconciliation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn reconcile_repairs_transfer_that_landed_after_timeout() {
    let ledger = funded_ledger(2.0);
    ledger.script_transfers([
        TransferBehavior::Succeed,
        TransferBehavior::LandThenHang,
    ]);
    let d = distributor(ledger, NullBatchStore::new());
    let plan = DistributionPlan::parse("2", "0.4").unwrap();

    let mut batch = d.distribute(&controller(), &plan).await.unwrap().batch;
    assert!(!batch.get(1).unwrap().transfer_success);
    let writes_before = d.store().write_count();

    let report = d.reconcile(&mut batch).await;

    assert_eq!(report.corrected_count(), 1);
    assert!(report.any_verified());
    let repaired = batch.get(1).unwrap();
    assert!(repaired.transfer_success);
    assert_eq!(repaired.amount, sol(0.4));
    assert_eq!(d.store().write_count(), writes_before + 1);
    assert_eq!(d.store().latest().unwrap(), batch);
}

#[tokio::test(start_paused = true)]
async fn reconcile_stored_batch_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solana_wallets.json");

    let ledger = funded_ledger(2.0);
    ledger.script_transfers([TransferBehavior::LandThenHang]);
    let d = Distributor::new(
        ledger,
        JsonFileStore::new(&path),
        SeededAccountFactory::new(3),
        DistributorConfig::default(),
    );
    let plan = DistributionPlan::parse("1", "0.25").unwrap();
    d.distribute(&controller(), &plan).await.unwrap();
    assert!(!d.store().load().unwrap().get(0).unwrap().transfer_success);

    let (batch, report) = d.reconcile_stored().await.unwrap();

    assert_eq!(report.corrected_count(), 1);
    assert!(batch.get(0).unwrap().transfer_success);
    let reloaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(reloaded, batch);
}

#[tokio::test(start_paused = true)]
async fn reconcile_stored_without_snapshot_is_persistence_error() {
    let d = distributor(NullLedger::new(), NullBatchStore::new());
    assert!(matches!(
        d.reconcile_stored().await,
        Err(DistributorError::Persistence(_))
    ));
}
