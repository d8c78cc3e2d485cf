use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributorError {
    #[error("{operation} did not complete within {deadline:?}")]
    Timeout {
        operation: &'static str,
        deadline: Duration,
    },

    #[error("ledger operation failed: {0}")]
    Operation(#[from] fanout_client::ClientError),

    #[error("config error: {0}")]
    Config(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] fanout_store::StoreError),
}

impl DistributorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
