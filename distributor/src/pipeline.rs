//! Sequential transfer pipeline.
//!
//! Records are funded strictly one after another. Each attempt's outcome is
//! written into its record and the whole batch is checkpointed before the
//! next destination is touched. There is no automatic retry: a failed or
//! timed-out transfer may still have landed, and resending could pay twice.

use std::time::Duration;

use fanout_client::LedgerClient;
use fanout_store::BatchStore;
use fanout_types::{Address, Batch, Lamports};
use tracing::{error, info, warn};

use crate::controller::ControllingAccount;
use crate::deadline::guarded;
use crate::DistributorError;

/// Likely reasons when not a single transfer succeeded.
pub const COMMON_FAILURE_CAUSES: &[&str] = &[
    "the controlling account does not hold enough funds",
    "the RPC endpoint is unreachable",
    "the controlling account does not exist on the selected cluster",
    "the RPC endpoint is rate limiting requests",
    "the transaction was sent but its confirmation was lost",
];

/// Failure recorded on a record whose transfer was cut off by the global deadline.
pub const ABANDONED_AT_DEADLINE: &str =
    "abandoned at the global deadline; the transaction may have landed";

/// Counters for one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failures caused by the per-transfer deadline (included in `failed`).
    pub timed_out: usize,
    /// Records skipped because they already carried an attempt.
    pub skipped: usize,
    pub checkpoint_failures: usize,
}

impl TransferSummary {
    /// Whether a transfer was started but its outcome never recorded.
    pub fn in_flight(&self) -> bool {
        self.attempted > self.succeeded + self.failed
    }

    /// Hints to show the operator, empty unless every attempt failed.
    pub fn failure_hints(&self) -> &'static [&'static str] {
        if self.attempted > 0 && self.succeeded == 0 {
            COMMON_FAILURE_CAUSES
        } else {
            &[]
        }
    }
}

/// Mark the record whose transfer was dropped mid-flight as failed.
///
/// Records are attempted in order and each outcome is written before the next
/// transfer starts, so the dropped transfer belongs to the first record with
/// no attempt. Once marked, a later run skips it instead of paying it twice.
/// Returns the record's index.
pub fn abandon_in_flight(batch: &mut Batch, summary: &mut TransferSummary) -> Option<u32> {
    if !summary.in_flight() {
        return None;
    }
    let record = batch.iter_mut().find(|r| !r.attempted())?;
    record.mark_failed(ABANDONED_AT_DEADLINE);
    summary.failed += 1;
    summary.timed_out += 1;
    Some(record.index)
}

/// Pays each record of a batch from the controlling account.
pub struct TransferPipeline<'a, C: ?Sized, S: ?Sized> {
    client: &'a C,
    store: &'a S,
    transfer_timeout: Duration,
}

impl<'a, C, S> TransferPipeline<'a, C, S>
where
    C: LedgerClient + ?Sized,
    S: BatchStore + ?Sized,
{
    pub fn new(client: &'a C, store: &'a S, transfer_timeout: Duration) -> Self {
        Self {
            client,
            store,
            transfer_timeout,
        }
    }

    /// Submit one transfer and wait for confirmation, under the per-transfer
    /// deadline. Returns the confirmation id.
    pub async fn transfer(
        &self,
        from: &ControllingAccount,
        to: &Address,
        amount: Lamports,
    ) -> Result<String, DistributorError> {
        guarded(
            "transfer",
            self.client.transfer(from.keypair(), to, amount),
            self.transfer_timeout,
        )
        .await
    }

    /// Attempt every record that has not been attempted yet, in order.
    ///
    /// `summary` is updated as the run progresses so that the caller keeps
    /// accurate counts even if this future is dropped part-way.
    pub async fn run(
        &self,
        from: &ControllingAccount,
        batch: &mut Batch,
        amount: Lamports,
        summary: &mut TransferSummary,
    ) {
        for position in 0..batch.len() {
            let Some(record) = batch.get(position) else {
                break;
            };
            if record.attempted() {
                summary.skipped += 1;
                continue;
            }
            let index = record.index;
            let address = record.address.clone();

            info!(index, %address, %amount, "transferring");
            summary.attempted += 1;
            let result = self.transfer(from, &address, amount).await;

            let Some(record) = batch.get_mut(position) else {
                break;
            };
            match result {
                Ok(signature) => {
                    info!(index, %address, %signature, "transfer confirmed");
                    record.mark_transferred(amount, signature);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    if e.is_timeout() {
                        summary.timed_out += 1;
                    }
                    summary.failed += 1;
                    error!(index, %address, error = %e, "transfer failed");
                    warn!(
                        index,
                        explorer = %self.client.explorer_url(&address),
                        "the transaction may still have landed; check the ledger before sending again"
                    );
                    record.mark_failed(e.to_string());
                }
            }

            self.checkpoint(batch, summary);
        }

        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "transfer phase finished"
        );
    }

    fn checkpoint(&self, batch: &Batch, summary: &mut TransferSummary) {
        if let Err(e) = self.store.save(batch) {
            summary.checkpoint_failures += 1;
            warn!(
                location = %self.store.location(),
                error = %e,
                "checkpoint failed; the stored batch is behind the in-memory state"
            );
        }
    }
}
