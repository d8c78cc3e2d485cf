//! Base58 account address.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger account address: the base58 encoding of a 32-byte Ed25519 public key.
///
/// Construction does not validate the encoding; the ledger client rejects
/// malformed addresses when it builds a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let addr = Address::new("abc");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"abc\"");
    }
}
