//! Account address derivation from public keys.
//!
//! Address format: base58 (Bitcoin alphabet) of the raw 32-byte Ed25519 public
//! key, no prefix and no checksum.

use fanout_types::{Address, PublicKey};

/// Derive the address of a public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    Address::new(bs58::encode(public_key.as_bytes()).into_string())
}
