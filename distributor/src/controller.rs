//! The operator-supplied funding account.

use fanout_crypto::{derive_address, keypair_from_secret};
use fanout_types::{Address, KeyPair};

use crate::DistributorError;

/// The account every transfer is paid from. Never persisted.
pub struct ControllingAccount {
    address: Address,
    keypair: KeyPair,
}

impl ControllingAccount {
    /// Parse a base58 secret (64-byte keypair or 32-byte seed).
    pub fn from_secret(secret: &str) -> Result<Self, DistributorError> {
        let keypair = keypair_from_secret(secret.trim())
            .map_err(|e| DistributorError::Config(format!("controlling credential: {e}")))?;
        Ok(Self::from_keypair(keypair))
    }

    pub fn from_keypair(keypair: KeyPair) -> Self {
        Self {
            address: derive_address(&keypair.public),
            keypair,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }
}

impl std::fmt::Debug for ControllingAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllingAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
