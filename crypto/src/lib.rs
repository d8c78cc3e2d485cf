//! Cryptographic primitives for fanout.
//!
//! - **Ed25519** key generation
//! - Base58 address derivation from public keys
//! - Base58 wallet secrets, converted through the ledger SDK's keypair

pub mod address;
pub mod error;
pub mod keys;

pub use address::derive_address;
pub use error::CryptoError;
pub use keys::{
    encode_secret, generate_keypair, keypair_from_secret, keypair_from_seed, public_from_private,
    to_ledger_keypair,
};
