//! JSON-RPC ledger client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fanout_types::{Address, Cluster, KeyPair, Lamports};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::transaction::{build_transfer, encode_transaction, transaction_id};
use crate::{ClientError, LedgerClient};

/// Per-request HTTP timeout. Whole operations are bounded by the caller.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Delay between signature status polls while waiting for confirmation.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How final a transaction must be before it counts as confirmed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(format!("unknown commitment: {other}")),
        }
    }
}

/// HTTP client for a ledger JSON-RPC endpoint.
///
/// Wraps `reqwest::Client` with the endpoint URL and provides typed methods
/// for each RPC call the distributor needs.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    rpc_url: String,
    cluster: Cluster,
    commitment: Commitment,
    poll_interval: Duration,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Whether the status has reached at least `target`.
    ///
    /// Older nodes omit `confirmationStatus`; a null `confirmations` count
    /// then means the transaction is rooted (finalized).
    pub fn reached(&self, target: Commitment) -> bool {
        let level = match (self.confirmation_status, self.confirmations) {
            (Some(status), _) => status,
            (None, None) => Commitment::Finalized,
            (None, Some(_)) => Commitment::Processed,
        };
        level >= target
    }
}

impl RpcLedgerClient {
    /// Create a client for `rpc_url` on `cluster`.
    pub fn new(
        rpc_url: impl Into<String>,
        cluster: Cluster,
        commitment: Commitment,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
            cluster,
            commitment,
            poll_interval: POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        })
    }

    /// Send a JSON-RPC request and decode the `result` field.
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("{method}: {e}")))?;

        if !response.status().is_success() {
            return Err(ClientError::Http(format!(
                "{method}: endpoint returned HTTP {}",
                response.status()
            )));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("{method}: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        let resp: WithContext<BlockhashValue> = self
            .rpc_call(
                "getLatestBlockhash",
                serde_json::json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Hash::from_str(&resp.value.blockhash).map_err(|e| {
            ClientError::InvalidResponse(format!("blockhash {}: {e}", resp.value.blockhash))
        })
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, ClientError> {
        self.rpc_call(
            "sendTransaction",
            serde_json::json!([
                BASE64.encode(wire),
                {
                    "encoding": "base64",
                    "preflightCommitment": self.commitment.as_str(),
                }
            ]),
        )
        .await
    }

    /// Fetch the status of a single signature, `None` if the node has not seen it.
    pub async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, ClientError> {
        let resp: WithContext<Vec<Option<SignatureStatus>>> = self
            .rpc_call(
                "getSignatureStatuses",
                serde_json::json!([[signature], { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(resp.value.into_iter().next().flatten())
    }

    /// Poll until `signature` reaches the configured commitment.
    ///
    /// This loop has no deadline of its own; callers bound it.
    pub async fn confirm_signature(&self, signature: &str) -> Result<(), ClientError> {
        loop {
            if let Some(status) = self.signature_status(signature).await? {
                if let Some(err) = status.err.as_ref().filter(|e| !e.is_null()) {
                    return Err(ClientError::TransactionFailed {
                        signature: signature.to_string(),
                        reason: err.to_string(),
                    });
                }
                if status.reached(self.commitment) {
                    return Ok(());
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn balance(&self, address: &Address) -> Result<Lamports, ClientError> {
        let resp: WithContext<u64> = self
            .rpc_call(
                "getBalance",
                serde_json::json!([address.as_str(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(Lamports::new(resp.value))
    }

    async fn request_airdrop(
        &self,
        address: &Address,
        amount: Lamports,
    ) -> Result<String, ClientError> {
        let signature: String = self
            .rpc_call(
                "requestAirdrop",
                serde_json::json!([
                    address.as_str(),
                    amount.raw(),
                    { "commitment": self.commitment.as_str() }
                ]),
            )
            .await?;
        tracing::debug!(%address, %signature, "airdrop submitted, awaiting confirmation");
        self.confirm_signature(&signature).await?;
        Ok(signature)
    }

    async fn transfer(
        &self,
        from: &KeyPair,
        to: &Address,
        amount: Lamports,
    ) -> Result<String, ClientError> {
        let blockhash = self.latest_blockhash().await?;
        let transaction = build_transfer(from, to, amount, blockhash)?;
        let wire = encode_transaction(&transaction)?;

        let returned = self.send_transaction(&wire).await?;
        if let Some(expected) = transaction_id(&transaction).filter(|id| *id != returned) {
            tracing::warn!(%expected, %returned, "node returned an unexpected transaction id");
        }
        tracing::debug!(%to, signature = %returned, "transfer submitted, awaiting confirmation");
        self.confirm_signature(&returned).await?;
        Ok(returned)
    }

    fn explorer_url(&self, address: &Address) -> String {
        self.cluster.explorer_url(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = RpcLedgerClient::new(
            Cluster::Devnet.default_rpc_url(),
            Cluster::Devnet,
            Commitment::Confirmed,
        )
        .unwrap();
        assert_eq!(client.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(client.cluster, Cluster::Devnet);
        assert_eq!(client.poll_interval, POLL_INTERVAL);
    }

    #[test]
    fn explorer_url_follows_cluster() {
        let client =
            RpcLedgerClient::new("http://localhost:1", Cluster::Testnet, Commitment::Finalized)
                .unwrap();
        let url = client.explorer_url(&Address::new("abc"));
        assert!(url.ends_with("abc?cluster=testnet"));
    }

    #[test]
    fn balance_response_deserialization() {
        let json = r#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":1500000000},"id":1}"#;
        let resp: RpcResponse<WithContext<u64>> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.result.unwrap().value, 1_500_000_000);
        assert!(resp.error.is_none());
    }

    #[test]
    fn error_response_deserialization() {
        let json = r#"{"jsonrpc":"2.0","error":{"code":-32003,"message":"airdrop limit"},"id":7}"#;
        let resp: RpcResponse<String> = serde_json::from_str(json).unwrap();
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32003);
        assert_eq!(err.message, "airdrop limit");
    }

    #[test]
    fn signature_status_levels() {
        let json = r#"{"context":{"slot":5},"value":[{"slot":5,"confirmations":3,"err":null,"confirmationStatus":"confirmed"},null]}"#;
        let resp: WithContext<Vec<Option<SignatureStatus>>> = serde_json::from_str(json).unwrap();
        let status = resp.value[0].as_ref().unwrap();
        assert!(status.reached(Commitment::Processed));
        assert!(status.reached(Commitment::Confirmed));
        assert!(!status.reached(Commitment::Finalized));
        assert!(status.err.is_none());
        assert!(resp.value[1].is_none());
    }

    #[test]
    fn legacy_status_without_confirmation_level() {
        let rooted = SignatureStatus {
            confirmations: None,
            err: None,
            confirmation_status: None,
        };
        assert!(rooted.reached(Commitment::Finalized));

        let recent = SignatureStatus {
            confirmations: Some(2),
            err: None,
            confirmation_status: None,
        };
        assert!(!recent.reached(Commitment::Confirmed));
    }

    #[test]
    fn commitment_parsing() {
        assert_eq!("Finalized".parse::<Commitment>(), Ok(Commitment::Finalized));
        assert!("eventual".parse::<Commitment>().is_err());
    }
}
