//! The ledger collaborator seam.

use async_trait::async_trait;
use fanout_types::{Address, KeyPair, Lamports};

use crate::ClientError;

/// Everything the distributor needs from the ledger network.
///
/// Implementations must not retry a transfer internally: a submitted transfer
/// has no idempotency key, so a blind resubmission can pay twice.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current balance of an address.
    async fn balance(&self, address: &Address) -> Result<Lamports, ClientError>;

    /// Request a faucet credit and wait for it to be confirmed.
    ///
    /// Returns the confirmation id of the credit.
    async fn request_airdrop(&self, address: &Address, amount: Lamports)
        -> Result<String, ClientError>;

    /// Build, sign, submit and confirm a single value transfer.
    ///
    /// Returns the confirmation id (the transaction signature).
    async fn transfer(
        &self,
        from: &KeyPair,
        to: &Address,
        amount: Lamports,
    ) -> Result<String, ClientError>;

    /// Block-explorer page for an address, for manual verification.
    fn explorer_url(&self, address: &Address) -> String;
}
