//! Cluster identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Address;

const EXPLORER_BASE: &str = "https://explorer.solana.com/address/";

/// Identifies which ledger cluster the distributor talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    /// The public development cluster (faucet available).
    #[default]
    Devnet,
    /// The public test cluster (faucet available).
    Testnet,
    /// The production cluster. Faucet requests always fail here.
    MainnetBeta,
    /// A local test validator.
    Localnet,
}

impl Cluster {
    /// Default JSON-RPC endpoint for this cluster.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Localnet => "http://127.0.0.1:8899",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
            Self::Localnet => "localnet",
        }
    }

    /// Block-explorer page for an address on this cluster.
    pub fn explorer_url(&self, address: &Address) -> String {
        match self {
            Self::MainnetBeta => format!("{EXPLORER_BASE}{address}"),
            Self::Localnet => format!(
                "{EXPLORER_BASE}{address}?cluster=custom&customUrl={}",
                self.default_rpc_url()
            ),
            other => format!("{EXPLORER_BASE}{address}?cluster={}", other.as_str()),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devnet" | "dev" => Ok(Self::Devnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "localnet" | "local" => Ok(Self::Localnet),
            other => Err(format!("unknown cluster: {other}")),
        }
    }
}
