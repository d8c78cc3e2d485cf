//! End-to-end distribution run.
//!
//! ```text
//! ensure funded -> generate N accounts -> persist -> transfer pipeline
//!                                                   (global deadline)
//!              -> reconcile (on request)
//! ```

use fanout_client::LedgerClient;
use fanout_store::BatchStore;
use fanout_types::Batch;
use tracing::{error, info, warn};

use crate::config::DistributorConfig;
use crate::controller::ControllingAccount;
use crate::factory::{generate_batch, AccountFactory};
use crate::funding::{ensure_funded, FundingOutcome, FundingPolicy};
use crate::pipeline::{abandon_in_flight, TransferPipeline, TransferSummary};
use crate::plan::DistributionPlan;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::DistributorError;

/// How the transfer phase ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistributionOutcome {
    Completed,
    /// The global deadline cut the transfer phase short.
    GlobalDeadlineExceeded,
}

/// Everything a distribution run produced.
#[derive(Debug)]
pub struct DistributionReport {
    pub funding: FundingOutcome,
    pub batch: Batch,
    pub summary: TransferSummary,
    pub outcome: DistributionOutcome,
}

impl DistributionReport {
    /// Process exit status for this run.
    pub fn exit_code(&self) -> u8 {
        match self.outcome {
            DistributionOutcome::Completed => 0,
            DistributionOutcome::GlobalDeadlineExceeded => 1,
        }
    }
}

/// Wires the ledger client, batch store and account factory together.
pub struct Distributor<C, S, F> {
    client: C,
    store: S,
    factory: F,
    config: DistributorConfig,
}

impl<C, S, F> Distributor<C, S, F>
where
    C: LedgerClient,
    S: BatchStore,
    F: AccountFactory,
{
    pub fn new(client: C, store: S, factory: F, config: DistributorConfig) -> Self {
        Self {
            client,
            store,
            factory,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// Top up the controlling account from the faucet when it runs low.
    pub async fn ensure_funded(
        &self,
        controller: &ControllingAccount,
    ) -> Result<FundingOutcome, DistributorError> {
        let policy = FundingPolicy {
            threshold: self.config.funding_threshold_lamports()?,
            airdrop_amount: self.config.airdrop_lamports()?,
            balance_timeout: self.config.balance_timeout(),
            airdrop_timeout: self.config.airdrop_timeout(),
        };
        Ok(ensure_funded(&self.client, controller.address(), &policy).await)
    }

    /// Generate a fresh batch of `count` accounts.
    pub fn generate_batch(&self, count: u32) -> Batch {
        let batch = generate_batch(&self.factory, count);
        info!(count, "generated accounts");
        batch
    }

    /// Run funding, generation and the transfer phase.
    ///
    /// Only configuration problems are errors. Ledger and persistence
    /// failures are recorded in the report and the run carries on.
    pub async fn distribute(
        &self,
        controller: &ControllingAccount,
        plan: &DistributionPlan,
    ) -> Result<DistributionReport, DistributorError> {
        let funding = self.ensure_funded(controller).await?;

        let mut batch = self.generate_batch(plan.count());
        let mut summary = TransferSummary::default();
        if let Err(e) = self.store.save(&batch) {
            summary.checkpoint_failures += 1;
            warn!(
                location = %self.store.location(),
                error = %e,
                "could not persist generated accounts; continuing with in-memory state"
            );
        } else {
            info!(location = %self.store.location(), "generated accounts saved");
        }

        let pipeline = TransferPipeline::new(&self.client, &self.store, self.config.transfer_timeout());
        let deadline = self.config.global_timeout();
        let run = pipeline.run(controller, &mut batch, plan.amount_per_account(), &mut summary);
        let finished = tokio::time::timeout(deadline, run).await;

        let outcome = match finished {
            Ok(()) => DistributionOutcome::Completed,
            Err(_) => {
                let abandoned = abandon_in_flight(&mut batch, &mut summary);
                error!(
                    deadline = ?deadline,
                    attempted = summary.attempted,
                    abandoned = ?abandoned,
                    "global deadline exceeded; abandoning the transfer in flight"
                );
                if let Err(e) = self.store.save(&batch) {
                    summary.checkpoint_failures += 1;
                    warn!(error = %e, "could not persist batch after global deadline");
                }
                DistributionOutcome::GlobalDeadlineExceeded
            }
        };

        Ok(DistributionReport {
            funding,
            batch,
            summary,
            outcome,
        })
    }

    /// Reconcile a batch against on-chain balances and persist the result.
    pub async fn reconcile(&self, batch: &mut Batch) -> ReconcileReport {
        Reconciler::new(&self.client, &self.store, self.config.balance_timeout())
            .reconcile(batch)
            .await
    }

    /// Load the stored batch and reconcile it.
    pub async fn reconcile_stored(&self) -> Result<(Batch, ReconcileReport), DistributorError> {
        let mut batch = self.store.load()?;
        info!(
            location = %self.store.location(),
            records = batch.len(),
            "loaded stored batch"
        );
        let report = self.reconcile(&mut batch).await;
        Ok((batch, report))
    }
}
