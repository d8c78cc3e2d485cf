//! Ledger client for fanout.
//!
//! The distributor only talks to the ledger through the [`LedgerClient`]
//! trait. [`RpcLedgerClient`] implements it over JSON-RPC; tests use the
//! in-memory fake from `fanout-nullables`.

pub mod error;
pub mod ledger;
pub mod rpc;
pub mod transaction;

pub use error::ClientError;
pub use ledger::LedgerClient;
pub use rpc::{Commitment, RpcLedgerClient};
