//! Nullable infrastructure for deterministic testing.
//!
//! The distributor's external dependencies (the ledger network and the batch
//! store) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return scripted, deterministic results
//! - Record every call for assertions
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod ledger;
pub mod store;

pub use ledger::{AirdropBehavior, LedgerCall, NullLedger, TransferBehavior};
pub use store::NullBatchStore;
