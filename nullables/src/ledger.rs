//! Nullable ledger: an in-memory balance sheet with scripted failures.

use async_trait::async_trait;
use fanout_client::{ClientError, LedgerClient};
use fanout_crypto::derive_address;
use fanout_types::{Address, Cluster, KeyPair, Lamports};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How the next transfer call behaves.
#[derive(Clone, Debug)]
pub enum TransferBehavior {
    /// Move the funds and confirm immediately.
    Succeed,
    /// Reject with an RPC error; no funds move.
    Fail(String),
    /// Never complete; no funds move.
    Hang,
    /// Move the funds, then never confirm.
    LandThenHang,
    /// Wait, then behave like `Succeed`.
    Delay(Duration),
}

/// How faucet requests behave.
#[derive(Clone, Debug)]
pub enum AirdropBehavior {
    Succeed,
    Fail(String),
    Hang,
}

/// A recorded call against the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    Balance(Address),
    Airdrop(Address, Lamports),
    Transfer {
        from: Address,
        to: Address,
        amount: Lamports,
    },
}

/// A deterministic ledger for testing.
///
/// Transfers consume the script in order; once it is exhausted every transfer
/// succeeds. Transfers debit the address derived from the signing key.
pub struct NullLedger {
    cluster: Cluster,
    balances: Mutex<HashMap<Address, Lamports>>,
    transfer_script: Mutex<VecDeque<TransferBehavior>>,
    airdrop: Mutex<AirdropBehavior>,
    unreachable: Mutex<HashSet<Address>>,
    hanging: Mutex<HashSet<Address>>,
    calls: Mutex<Vec<LedgerCall>>,
    next_signature: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            cluster: Cluster::Devnet,
            balances: Mutex::new(HashMap::new()),
            transfer_script: Mutex::new(VecDeque::new()),
            airdrop: Mutex::new(AirdropBehavior::Succeed),
            unreachable: Mutex::new(HashSet::new()),
            hanging: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            next_signature: AtomicU64::new(1),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the balance of an address.
    pub fn set_balance(&self, address: &Address, amount: Lamports) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.clone(), amount);
    }

    /// Queue transfer behaviours, consumed one per transfer call.
    pub fn script_transfers(&self, behaviors: impl IntoIterator<Item = TransferBehavior>) {
        self.transfer_script.lock().unwrap().extend(behaviors);
    }

    pub fn set_airdrop(&self, behavior: AirdropBehavior) {
        *self.airdrop.lock().unwrap() = behavior;
    }

    /// Make balance queries for `address` fail.
    pub fn make_unreachable(&self, address: &Address) {
        self.unreachable.lock().unwrap().insert(address.clone());
    }

    /// Make balance queries for `address` never complete.
    pub fn make_hanging(&self, address: &Address) {
        self.hanging.lock().unwrap().insert(address.clone());
    }

    pub fn balance_of(&self, address: &Address) -> Lamports {
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(Lamports::ZERO)
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Destinations of transfer calls, in the order they were made.
    pub fn transfer_targets(&self) -> Vec<Address> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LedgerCall::Transfer { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }

    pub fn airdrop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LedgerCall::Airdrop(..)))
            .count()
    }

    /// Highest number of transfers that were ever in flight at once.
    pub fn max_concurrent_transfers(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: LedgerCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn signature(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_signature.fetch_add(1, Ordering::SeqCst))
    }

    fn move_funds(&self, from: &Address, to: &Address, amount: Lamports) -> Result<(), ClientError> {
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(from).copied().unwrap_or(Lamports::ZERO);
        let remaining = available.checked_sub(amount).ok_or_else(|| ClientError::Rpc {
            code: -32002,
            message: format!("insufficient funds: have {available}, need {amount}"),
        })?;
        balances.insert(from.clone(), remaining);
        let credited = balances.get(to).copied().unwrap_or(Lamports::ZERO) + amount;
        balances.insert(to.clone(), credited);
        Ok(())
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn address_of(keypair: &KeyPair) -> Address {
    derive_address(&keypair.public)
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn balance(&self, address: &Address) -> Result<Lamports, ClientError> {
        self.record(LedgerCall::Balance(address.clone()));
        if self.hanging.lock().unwrap().contains(address) {
            std::future::pending::<()>().await;
        }
        if self.unreachable.lock().unwrap().contains(address) {
            return Err(ClientError::Http("getBalance: connection refused".into()));
        }
        Ok(self.balance_of(address))
    }

    async fn request_airdrop(
        &self,
        address: &Address,
        amount: Lamports,
    ) -> Result<String, ClientError> {
        self.record(LedgerCall::Airdrop(address.clone(), amount));
        let behavior = self.airdrop.lock().unwrap().clone();
        match behavior {
            AirdropBehavior::Succeed => {
                let credited = self.balance_of(address) + amount;
                self.set_balance(address, credited);
                Ok(self.signature("airdrop"))
            }
            AirdropBehavior::Fail(message) => Err(ClientError::Rpc {
                code: -32603,
                message,
            }),
            AirdropBehavior::Hang => std::future::pending().await,
        }
    }

    async fn transfer(
        &self,
        from: &KeyPair,
        to: &Address,
        amount: Lamports,
    ) -> Result<String, ClientError> {
        let from = address_of(from);
        self.record(LedgerCall::Transfer {
            from: from.clone(),
            to: to.clone(),
            amount,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let behavior = self
            .transfer_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TransferBehavior::Succeed);

        match behavior {
            TransferBehavior::Succeed => {
                self.move_funds(&from, to, amount)?;
                Ok(self.signature("transfer"))
            }
            TransferBehavior::Fail(message) => Err(ClientError::Rpc {
                code: -32000,
                message,
            }),
            TransferBehavior::Hang => std::future::pending().await,
            TransferBehavior::LandThenHang => {
                self.move_funds(&from, to, amount)?;
                std::future::pending().await
            }
            TransferBehavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                self.move_funds(&from, to, amount)?;
                Ok(self.signature("transfer"))
            }
        }
    }

    fn explorer_url(&self, address: &Address) -> String {
        self.cluster.explorer_url(address)
    }
}
