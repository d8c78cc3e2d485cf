//! Validated operator inputs for a distribution run.

use fanout_types::Lamports;

use crate::DistributorError;

/// How many accounts to create and how much each receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistributionPlan {
    count: u32,
    amount_per_account: Lamports,
}

impl DistributionPlan {
    pub fn new(count: u32, amount_per_account: Lamports) -> Result<Self, DistributorError> {
        if count == 0 {
            return Err(DistributorError::Config(
                "account count must be at least 1".into(),
            ));
        }
        if amount_per_account.is_zero() {
            return Err(DistributorError::Config(
                "amount per account must be positive".into(),
            ));
        }
        Ok(Self {
            count,
            amount_per_account,
        })
    }

    /// Parse raw operator input: an integer count and a token amount.
    pub fn parse(count: &str, amount: &str) -> Result<Self, DistributorError> {
        let count: u32 = count.trim().parse().map_err(|_| {
            DistributorError::Config(format!("account count must be a positive integer, got {count:?}"))
        })?;
        let tokens: f64 = amount.trim().parse().map_err(|_| {
            DistributorError::Config(format!("amount must be a number, got {amount:?}"))
        })?;
        let amount_per_account = Lamports::from_sol(tokens).ok_or_else(|| {
            DistributorError::Config(format!("amount must be a non-negative finite number, got {tokens}"))
        })?;
        Self::new(count, amount_per_account)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn amount_per_account(&self) -> Lamports {
        self.amount_per_account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_input() {
        let plan = DistributionPlan::parse("3", "0.4").unwrap();
        assert_eq!(plan.count(), 3);
        assert_eq!(plan.amount_per_account(), Lamports::new(400_000_000));
    }

    #[test]
    fn rejects_bad_counts() {
        for bad in ["0", "-2", "abc", "2.5", ""] {
            assert!(
                matches!(DistributionPlan::parse(bad, "1"), Err(DistributorError::Config(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_amounts() {
        for bad in ["0", "-0.5", "NaN", "inf", "lots", "0.0000000001"] {
            assert!(
                matches!(DistributionPlan::parse("1", bad), Err(DistributorError::Config(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
