//! Distribution batch: the roster of generated accounts and their transfer state.
//!
//! The batch is the unit of persistence. It is written as a whole JSON array
//! after every mutation, so the on-disk file is always a complete snapshot.

use serde::{Deserialize, Serialize};

use crate::amount::as_sol;
use crate::{Address, Lamports};

/// One generated account and the outcome of funding it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// 1-based position in the batch.
    pub index: u32,
    pub address: Address,
    /// Base58-encoded 64-byte secret (seed || public key).
    pub secret: String,
    /// Amount confirmed transferred, or observed during reconciliation.
    #[serde(with = "as_sol")]
    pub amount: Lamports,
    pub transfer_success: bool,
    /// Confirmation id of the successful transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Reason the transfer attempt failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl AccountRecord {
    /// A freshly generated, unfunded record.
    pub fn new(index: u32, address: Address, secret: String) -> Self {
        Self {
            index,
            address,
            secret,
            amount: Lamports::ZERO,
            transfer_success: false,
            signature: None,
            failure: None,
        }
    }

    /// Record a confirmed transfer.
    pub fn mark_transferred(&mut self, amount: Lamports, signature: impl Into<String>) {
        self.amount = amount;
        self.transfer_success = true;
        self.signature = Some(signature.into());
        self.failure = None;
    }

    /// Record a failed attempt. The amount is left untouched.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.transfer_success = false;
        self.failure = Some(reason.into());
    }

    /// Whether a transfer has already been attempted for this record.
    pub fn attempted(&self) -> bool {
        self.transfer_success || self.signature.is_some() || self.failure.is_some()
    }

    /// Apply a balance observed on-chain.
    ///
    /// A positive balance on an unsuccessful record proves the transfer landed:
    /// the record flips to success and takes the observed amount. Anything else
    /// leaves the record as is, so a successful record is never downgraded.
    /// Returns `true` if the record changed. The failure reason of the original
    /// attempt is kept for the audit trail.
    pub fn apply_observed_balance(&mut self, observed: Lamports) -> bool {
        if observed.is_zero() || self.transfer_success {
            return false;
        }
        self.transfer_success = true;
        self.amount = observed;
        true
    }
}

/// Ordered roster of generated accounts, persisted as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    records: Vec<AccountRecord>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: AccountRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AccountRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&AccountRecord> {
        self.records.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut AccountRecord> {
        self.records.get_mut(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccountRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, AccountRecord> {
        self.records.iter_mut()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a AccountRecord;
    type IntoIter = std::slice::Iter<'a, AccountRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
