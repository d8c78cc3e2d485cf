//! Fundamental types for fanout.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! lamport amounts, addresses, key material, cluster identifiers, and the
//! distribution batch that is persisted after every checkpoint.

pub mod address;
pub mod amount;
pub mod batch;
pub mod keys;
pub mod network;

pub use address::Address;
pub use amount::{Lamports, LAMPORTS_PER_SOL};
pub use batch::{AccountRecord, Batch};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use network::Cluster;
