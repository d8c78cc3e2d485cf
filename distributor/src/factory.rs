//! Account generation.

use std::sync::atomic::{AtomicU64, Ordering};

use fanout_crypto::{derive_address, encode_secret, generate_keypair, keypair_from_seed};
use fanout_types::{AccountRecord, Address, Batch, KeyPair};

/// A freshly generated account: its address and base58-encoded secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedAccount {
    pub address: Address,
    pub secret: String,
}

impl GeneratedAccount {
    fn from_keypair(keypair: &KeyPair) -> Self {
        Self {
            address: derive_address(&keypair.public),
            secret: encode_secret(keypair),
        }
    }
}

/// Source of new accounts. Generation never touches the network.
pub trait AccountFactory: Send + Sync {
    fn generate(&self) -> GeneratedAccount;
}

/// Generates accounts from the operating system's randomness source.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsAccountFactory;

impl AccountFactory for OsAccountFactory {
    fn generate(&self) -> GeneratedAccount {
        GeneratedAccount::from_keypair(&generate_keypair())
    }
}

/// Deterministic factory: account `n` is derived from `(base, n)`.
///
/// Only for tests and reproducible dry runs; the keys are predictable.
#[derive(Debug)]
pub struct SeededAccountFactory {
    base: u64,
    counter: AtomicU64,
}

impl SeededAccountFactory {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            counter: AtomicU64::new(0),
        }
    }
}

impl AccountFactory for SeededAccountFactory {
    fn generate(&self) -> GeneratedAccount {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&self.base.to_le_bytes());
        seed[8..16].copy_from_slice(&n.to_le_bytes());
        seed[31] = 1;
        GeneratedAccount::from_keypair(&keypair_from_seed(&seed))
    }
}

/// Generate `count` unfunded records, indexed from 1.
pub fn generate_batch<F: AccountFactory + ?Sized>(factory: &F, count: u32) -> Batch {
    let mut batch = Batch::with_capacity(count as usize);
    for index in 1..=count {
        let account = factory.generate();
        batch.push(AccountRecord::new(index, account.address, account.secret));
    }
    batch
}
