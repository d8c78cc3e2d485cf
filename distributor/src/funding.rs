//! Faucet top-up of the controlling account.
//!
//! Funding never aborts a run: every failure is logged and reported in the
//! outcome, and the transfer phase goes ahead regardless.

use std::fmt;
use std::time::Duration;

use fanout_client::LedgerClient;
use fanout_types::{Address, Lamports};
use tracing::{info, warn};

use crate::deadline::guarded;

/// When and how much to request from the faucet.
#[derive(Clone, Copy, Debug)]
pub struct FundingPolicy {
    pub threshold: Lamports,
    pub airdrop_amount: Lamports,
    pub balance_timeout: Duration,
    pub airdrop_timeout: Duration,
}

/// What the funding step did.
#[derive(Clone, Debug, PartialEq)]
pub enum FundingOutcome {
    /// Balance already at or above the threshold.
    Sufficient { balance: Lamports },
    /// A faucet credit landed. `after` is `None` if the re-read failed.
    Airdropped {
        before: Lamports,
        after: Option<Lamports>,
        signature: String,
    },
    /// The faucet request failed or timed out.
    AirdropFailed { balance: Lamports, reason: String },
    /// The initial balance read failed; the faucet was not tried.
    BalanceUnknown { reason: String },
}

impl fmt::Display for FundingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sufficient { balance } => write!(f, "balance {balance}, no faucet credit needed"),
            Self::Airdropped {
                before,
                after: Some(after),
                ..
            } => write!(f, "faucet credit received: {before} -> {after}"),
            Self::Airdropped { before, after: None, .. } => {
                write!(f, "faucet credit received (balance was {before}, re-read failed)")
            }
            Self::AirdropFailed { balance, reason } => {
                write!(f, "faucet credit failed at balance {balance}: {reason}")
            }
            Self::BalanceUnknown { reason } => write!(f, "balance unknown: {reason}"),
        }
    }
}

/// Top up `address` from the faucet if its balance is below the threshold.
pub async fn ensure_funded<C: LedgerClient + ?Sized>(
    client: &C,
    address: &Address,
    policy: &FundingPolicy,
) -> FundingOutcome {
    let before = match guarded("balance query", client.balance(address), policy.balance_timeout).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!(%address, error = %e, "could not read controlling balance; skipping faucet");
            return FundingOutcome::BalanceUnknown {
                reason: e.to_string(),
            };
        }
    };
    info!(%address, balance = %before, "controlling balance");

    if before >= policy.threshold {
        return FundingOutcome::Sufficient { balance: before };
    }

    info!(
        %address,
        balance = %before,
        threshold = %policy.threshold,
        amount = %policy.airdrop_amount,
        "balance below threshold, requesting faucet credit"
    );
    let signature = match guarded(
        "faucet request",
        client.request_airdrop(address, policy.airdrop_amount),
        policy.airdrop_timeout,
    )
    .await
    {
        Ok(signature) => signature,
        Err(e) => {
            warn!(
                %address,
                error = %e,
                "faucet credit failed; continuing with the current balance"
            );
            return FundingOutcome::AirdropFailed {
                balance: before,
                reason: e.to_string(),
            };
        }
    };

    let after = match guarded("balance query", client.balance(address), policy.balance_timeout).await {
        Ok(balance) => {
            info!(%address, balance = %balance, %signature, "faucet credit confirmed");
            Some(balance)
        }
        Err(e) => {
            warn!(%address, error = %e, "could not re-read balance after faucet credit");
            None
        }
    };

    FundingOutcome::Airdropped {
        before,
        after,
        signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_nullables::{AirdropBehavior, LedgerCall, NullLedger};

    fn policy() -> FundingPolicy {
        FundingPolicy {
            threshold: Lamports::new(100_000_000),
            airdrop_amount: Lamports::new(2_000_000_000),
            balance_timeout: Duration::from_secs(10),
            airdrop_timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn funded_account_skips_faucet() {
        let ledger = NullLedger::new();
        let addr = Address::new("controller");
        ledger.set_balance(&addr, Lamports::new(1_500_000_000));

        let outcome = ensure_funded(&ledger, &addr, &policy()).await;
        assert_eq!(
            outcome,
            FundingOutcome::Sufficient {
                balance: Lamports::new(1_500_000_000)
            }
        );
        assert_eq!(ledger.airdrop_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exactly_at_threshold_is_sufficient() {
        let ledger = NullLedger::new();
        let addr = Address::new("controller");
        ledger.set_balance(&addr, Lamports::new(100_000_000));
        let outcome = ensure_funded(&ledger, &addr, &policy()).await;
        assert!(matches!(outcome, FundingOutcome::Sufficient { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn low_balance_requests_and_rereads() {
        let ledger = NullLedger::new();
        let addr = Address::new("controller");
        ledger.set_balance(&addr, Lamports::new(50_000_000));

        let outcome = ensure_funded(&ledger, &addr, &policy()).await;
        match outcome {
            FundingOutcome::Airdropped { before, after, .. } => {
                assert_eq!(before, Lamports::new(50_000_000));
                assert_eq!(after, Some(Lamports::new(2_050_000_000)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            ledger.calls(),
            vec![
                LedgerCall::Balance(addr.clone()),
                LedgerCall::Airdrop(addr.clone(), Lamports::new(2_000_000_000)),
                LedgerCall::Balance(addr),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn faucet_failure_is_not_fatal() {
        let ledger = NullLedger::new();
        let addr = Address::new("controller");
        ledger.set_balance(&addr, Lamports::new(50_000_000));
        ledger.set_airdrop(AirdropBehavior::Fail("airdrop limit reached".into()));

        let outcome = ensure_funded(&ledger, &addr, &policy()).await;
        assert!(matches!(
            outcome,
            FundingOutcome::AirdropFailed { balance, .. } if balance == Lamports::new(50_000_000)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_faucet_times_out() {
        let ledger = NullLedger::new();
        let addr = Address::new("controller");
        ledger.set_airdrop(AirdropBehavior::Hang);

        let start = tokio::time::Instant::now();
        let outcome = ensure_funded(&ledger, &addr, &policy()).await;
        assert!(matches!(outcome, FundingOutcome::AirdropFailed { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_balance_skips_faucet() {
        let ledger = NullLedger::new();
        let addr = Address::new("controller");
        ledger.make_unreachable(&addr);

        let outcome = ensure_funded(&ledger, &addr, &policy()).await;
        assert!(matches!(outcome, FundingOutcome::BalanceUnknown { .. }));
        assert_eq!(ledger.airdrop_count(), 0);
    }
}
