//! Distributor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fanout_client::Commitment;
use fanout_types::{Cluster, Lamports};
use fanout_utils::LogFormat;

use crate::DistributorError;

/// Configuration for a distribution run.
///
/// Can be loaded from a TOML file via [`DistributorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Operator inputs (credential,
/// account count, amount) are deliberately not part of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Which cluster to talk to.
    #[serde(default)]
    pub cluster: Cluster,

    /// JSON-RPC endpoint. Falls back to the cluster's public endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Commitment level a transfer must reach to count as confirmed.
    #[serde(default)]
    pub commitment: Commitment,

    /// Where the batch snapshot is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Deadline for one transfer (submit + confirm), in seconds.
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,

    /// Deadline for one balance query, in seconds.
    #[serde(default = "default_balance_timeout")]
    pub balance_timeout_secs: u64,

    /// Deadline for a faucet request (request + confirm), in seconds.
    #[serde(default = "default_airdrop_timeout")]
    pub airdrop_timeout_secs: u64,

    /// Deadline for the whole transfer phase, in seconds.
    #[serde(default = "default_global_timeout")]
    pub global_timeout_secs: u64,

    /// Controlling balance (tokens) below which a faucet credit is requested.
    #[serde(default = "default_funding_threshold")]
    pub funding_threshold: f64,

    /// Faucet credit size (tokens).
    #[serde(default = "default_airdrop_amount")]
    pub airdrop_amount: f64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_output() -> PathBuf {
    PathBuf::from("solana_wallets.json")
}

fn default_transfer_timeout() -> u64 {
    30
}

fn default_balance_timeout() -> u64 {
    10
}

fn default_airdrop_timeout() -> u64 {
    30
}

fn default_global_timeout() -> u64 {
    60
}

fn default_funding_threshold() -> f64 {
    0.1
}

fn default_airdrop_amount() -> f64 {
    2.0
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DistributorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DistributorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DistributorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DistributorError> {
        let config: Self = toml::from_str(s).map_err(|e| DistributorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DistributorError> {
        toml::to_string_pretty(self).map_err(|e| DistributorError::Config(e.to_string()))
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<(), DistributorError> {
        for (name, secs) in [
            ("transfer_timeout_secs", self.transfer_timeout_secs),
            ("balance_timeout_secs", self.balance_timeout_secs),
            ("airdrop_timeout_secs", self.airdrop_timeout_secs),
            ("global_timeout_secs", self.global_timeout_secs),
        ] {
            if secs == 0 {
                return Err(DistributorError::Config(format!("{name} must be positive")));
            }
        }
        self.funding_threshold_lamports()?;
        self.airdrop_lamports()?;
        Ok(())
    }

    /// The RPC endpoint to use.
    pub fn effective_rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.cluster.default_rpc_url())
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn balance_timeout(&self) -> Duration {
        Duration::from_secs(self.balance_timeout_secs)
    }

    pub fn airdrop_timeout(&self) -> Duration {
        Duration::from_secs(self.airdrop_timeout_secs)
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_secs(self.global_timeout_secs)
    }

    pub fn funding_threshold_lamports(&self) -> Result<Lamports, DistributorError> {
        Lamports::from_sol(self.funding_threshold).ok_or_else(|| {
            DistributorError::Config(format!(
                "funding_threshold must be a non-negative token amount, got {}",
                self.funding_threshold
            ))
        })
    }

    pub fn airdrop_lamports(&self) -> Result<Lamports, DistributorError> {
        match Lamports::from_sol(self.airdrop_amount) {
            Some(amount) if !amount.is_zero() => Ok(amount),
            _ => Err(DistributorError::Config(format!(
                "airdrop_amount must be a positive token amount, got {}",
                self.airdrop_amount
            ))),
        }
    }
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_url: None,
            commitment: Commitment::default(),
            output: default_output(),
            transfer_timeout_secs: default_transfer_timeout(),
            balance_timeout_secs: default_balance_timeout(),
            airdrop_timeout_secs: default_airdrop_timeout(),
            global_timeout_secs: default_global_timeout(),
            funding_threshold: default_funding_threshold(),
            airdrop_amount: default_airdrop_amount(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
