//! Funds distribution for fanout.
//!
//! A run tops up the controlling account from the faucet when it is low,
//! generates a batch of fresh accounts, persists it, then pays each account
//! in turn. Every transfer is bounded by its own deadline and the whole
//! transfer phase by a global one. The batch is checkpointed after each
//! attempt, and a reconciliation pass can later repair records whose
//! transfer landed without being confirmed.

pub mod config;
pub mod controller;
pub mod deadline;
pub mod error;
pub mod factory;
pub mod funding;
pub mod orchestrator;
pub mod pipeline;
pub mod plan;
pub mod reconcile;

pub use config::DistributorConfig;
pub use controller::ControllingAccount;
pub use deadline::{run_with_deadline, DeadlineError};
pub use error::DistributorError;
pub use factory::{
    generate_batch, AccountFactory, GeneratedAccount, OsAccountFactory, SeededAccountFactory,
};
pub use funding::{ensure_funded, FundingOutcome, FundingPolicy};
pub use orchestrator::{DistributionOutcome, DistributionReport, Distributor};
pub use pipeline::{
    abandon_in_flight, TransferPipeline, TransferSummary, ABANDONED_AT_DEADLINE,
    COMMON_FAILURE_CAUSES,
};
pub use plan::DistributionPlan;
pub use reconcile::{BalanceObservation, ReconcileReport, ReconciledAccount, Reconciler};
