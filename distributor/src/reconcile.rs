//! Balance reconciliation.
//!
//! After the transfer phase some records may be marked failed even though
//! the transfer landed (for example, the confirmation wait timed out). The
//! reconciler reads every generated account's balance and upgrades records
//! whose balance proves the transfer happened. It never downgrades a record.

use std::fmt;
use std::time::Duration;

use fanout_client::LedgerClient;
use fanout_store::BatchStore;
use fanout_types::{Address, Batch, Lamports};
use tracing::{info, warn};

use crate::deadline::guarded;

/// Result of a single balance query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BalanceObservation {
    Known(Lamports),
    /// The query failed or timed out.
    Unknown(String),
}

impl fmt::Display for BalanceObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(balance) => balance.fmt(f),
            Self::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}

/// Per-record line of a reconciliation report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledAccount {
    pub index: u32,
    pub address: Address,
    pub observation: BalanceObservation,
    pub transfer_success: bool,
    /// The record was upgraded by this pass.
    pub corrected: bool,
    pub explorer_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub accounts: Vec<ReconciledAccount>,
    /// Whether the reconciled batch was written back.
    pub persisted: bool,
}

impl ReconcileReport {
    /// At least one balance could be read.
    pub fn any_verified(&self) -> bool {
        self.accounts
            .iter()
            .any(|a| matches!(a.observation, BalanceObservation::Known(_)))
    }

    pub fn corrected_count(&self) -> usize {
        self.accounts.iter().filter(|a| a.corrected).count()
    }

    /// Accounts whose balance could not be read, for manual checking.
    pub fn unverifiable(&self) -> impl Iterator<Item = &ReconciledAccount> {
        self.accounts
            .iter()
            .filter(|a| matches!(a.observation, BalanceObservation::Unknown(_)))
    }
}

/// Reads balances for every record of a batch and patches contradictions.
pub struct Reconciler<'a, C: ?Sized, S: ?Sized> {
    client: &'a C,
    store: &'a S,
    balance_timeout: Duration,
}

impl<'a, C, S> Reconciler<'a, C, S>
where
    C: LedgerClient + ?Sized,
    S: BatchStore + ?Sized,
{
    pub fn new(client: &'a C, store: &'a S, balance_timeout: Duration) -> Self {
        Self {
            client,
            store,
            balance_timeout,
        }
    }

    /// Query each record's balance in order, then persist the batch once.
    pub async fn reconcile(&self, batch: &mut Batch) -> ReconcileReport {
        let mut report = ReconcileReport {
            accounts: Vec::with_capacity(batch.len()),
            persisted: false,
        };

        for record in batch.iter_mut() {
            let observation = match guarded(
                "balance query",
                self.client.balance(&record.address),
                self.balance_timeout,
            )
            .await
            {
                Ok(balance) => BalanceObservation::Known(balance),
                Err(e) => {
                    warn!(index = record.index, address = %record.address, error = %e, "balance unavailable");
                    BalanceObservation::Unknown(e.to_string())
                }
            };

            let corrected = match &observation {
                BalanceObservation::Known(balance) => record.apply_observed_balance(*balance),
                BalanceObservation::Unknown(_) => false,
            };
            if corrected {
                info!(
                    index = record.index,
                    address = %record.address,
                    balance = %record.amount,
                    "balance shows the transfer landed; record corrected"
                );
            }

            report.accounts.push(ReconciledAccount {
                index: record.index,
                address: record.address.clone(),
                observation,
                transfer_success: record.transfer_success,
                corrected,
                explorer_url: self.client.explorer_url(&record.address),
            });
        }

        match self.store.save(batch) {
            Ok(()) => report.persisted = true,
            Err(e) => warn!(
                location = %self.store.location(),
                error = %e,
                "could not persist reconciled batch"
            ),
        }

        info!(
            accounts = report.accounts.len(),
            corrected = report.corrected_count(),
            verified = report.any_verified(),
            "reconciliation finished"
        );
        report
    }
}
