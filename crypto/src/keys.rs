//! Ed25519 key generation and the wallet secret format.
//!
//! Secrets are exchanged in the ledger wallets' base58 keypair format. The
//! SDK's [`Keypair`] owns that codec; this module only converts between it
//! and [`KeyPair`].

use ed25519_dalek::SigningKey;
use fanout_types::{KeyPair, PrivateKey, PublicKey};
use rand::rngs::OsRng;
use solana_sdk::signature::{Keypair, Signer};
use zeroize::Zeroizing;

use crate::CryptoError;

/// Generate a new Ed25519 key pair from the operating system's randomness source.
///
/// Panics only if the OS randomness source is unavailable, which is treated as fatal.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        public: PublicKey(verifying_key.to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let private = PrivateKey(*seed);
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// The SDK signer for a key pair.
pub fn to_ledger_keypair(keypair: &KeyPair) -> Keypair {
    Keypair::new_from_array(keypair.private.0)
}

/// Encode a key pair as a base58 wallet secret.
pub fn encode_secret(keypair: &KeyPair) -> String {
    to_ledger_keypair(keypair).to_base58_string()
}

/// Decode a base58 secret into a key pair.
///
/// Accepts a full wallet keypair (its public half must match the seed) or a
/// bare 32-byte seed.
pub fn keypair_from_secret(secret: &str) -> Result<KeyPair, CryptoError> {
    let decoded = Zeroizing::new(
        bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| CryptoError::Base58(e.to_string()))?,
    );

    let mut seed = Zeroizing::new([0u8; 32]);
    match decoded.len() {
        32 => seed.copy_from_slice(&decoded),
        64 => {
            let wallet =
                Keypair::try_from(decoded.as_slice()).map_err(|_| CryptoError::SecretMismatch)?;
            seed.copy_from_slice(&decoded[..32]);
            if wallet.pubkey().to_bytes() != public_from_private(&PrivateKey(*seed)).0 {
                return Err(CryptoError::SecretMismatch);
            }
        }
        other => return Err(CryptoError::SecretLength(other)),
    }
    Ok(keypair_from_seed(&seed))
}
