//! Timeout-guarded execution of async operations.
//!
//! The operation is raced against a timer with `tokio::time::timeout`. On
//! expiry the operation future is dropped, which cancels it locally; any
//! request it already sent may still take effect on the remote side.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use fanout_client::ClientError;

use crate::DistributorError;

/// Outcome of a guarded operation that did not produce a value.
#[derive(Debug, PartialEq, Eq)]
pub enum DeadlineError<E> {
    /// The deadline passed first.
    Elapsed(Duration),
    /// The operation completed with its own error.
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for DeadlineError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elapsed(deadline) => write!(f, "deadline of {deadline:?} exceeded"),
            Self::Failed(e) => e.fmt(f),
        }
    }
}

/// Run `operation`, giving up after `deadline`.
pub async fn run_with_deadline<F, T, E>(
    operation: F,
    deadline: Duration,
) -> Result<T, DeadlineError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DeadlineError::Failed(e)),
        Err(_) => Err(DeadlineError::Elapsed(deadline)),
    }
}

/// Run a ledger operation under a deadline, mapping both failure kinds into
/// [`DistributorError`].
pub(crate) async fn guarded<F, T>(
    name: &'static str,
    operation: F,
    deadline: Duration,
) -> Result<T, DistributorError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    run_with_deadline(operation, deadline)
        .await
        .map_err(|e| match e {
            DeadlineError::Elapsed(deadline) => DistributorError::Timeout {
                operation: name,
                deadline,
            },
            DeadlineError::Failed(e) => DistributorError::Operation(e),
        })
}
