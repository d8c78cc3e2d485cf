//! Human-readable run reports on stdout.

use std::io::{self, Write};
use std::time::Duration;

use fanout_distributor::{BalanceObservation, DistributionOutcome, DistributionReport, ReconcileReport};
use fanout_types::Batch;
use fanout_utils::format_duration;

pub fn write_distribution(
    out: &mut impl Write,
    report: &DistributionReport,
    location: &str,
    elapsed: Duration,
) -> io::Result<()> {
    let s = &report.summary;
    writeln!(out)?;
    writeln!(out, "Funding: {}", report.funding)?;
    writeln!(
        out,
        "Transfers: {} of {} confirmed ({} failed, {} timed out) in {}",
        s.succeeded,
        s.attempted,
        s.failed,
        s.timed_out,
        format_duration(elapsed)
    )?;
    write_batch(out, &report.batch)?;
    writeln!(out, "Batch saved to {location}")?;
    if s.checkpoint_failures > 0 {
        writeln!(
            out,
            "Warning: {} checkpoint(s) could not be written; the saved batch may be stale.",
            s.checkpoint_failures
        )?;
    }

    if s.failed > 0 {
        writeln!(
            out,
            "IMPORTANT: {} transfer(s) failed or timed out, but a failed transfer may still have landed.",
            s.failed
        )?;
        writeln!(
            out,
            "Check the accounts in the explorer or run `fanout reconcile --output {location}` before sending to them again."
        )?;
    }

    let hints = s.failure_hints();
    if !hints.is_empty() {
        writeln!(out, "No transfer succeeded. Common causes:")?;
        for hint in hints {
            writeln!(out, "  - {hint}")?;
        }
    }

    if report.outcome == DistributionOutcome::GlobalDeadlineExceeded {
        writeln!(
            out,
            "The run hit its global deadline. Run `fanout reconcile --output {location}` to check which transfers landed."
        )?;
    }
    Ok(())
}

pub fn write_batch(out: &mut impl Write, batch: &Batch) -> io::Result<()> {
    for record in batch {
        let status = if record.transfer_success {
            "ok".to_string()
        } else if let Some(reason) = &record.failure {
            format!("FAILED: {reason}")
        } else {
            "not attempted".to_string()
        };
        writeln!(
            out,
            "  #{:<3} {}  {}  {}",
            record.index, record.address, record.amount, status
        )?;
    }
    Ok(())
}

pub fn write_reconcile(out: &mut impl Write, report: &ReconcileReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Balances:")?;
    for account in &report.accounts {
        let mark = if account.corrected { "  [corrected]" } else { "" };
        match &account.observation {
            BalanceObservation::Known(balance) => {
                writeln!(out, "  #{:<3} {}  {}{mark}", account.index, account.address, balance)?
            }
            BalanceObservation::Unknown(reason) => writeln!(
                out,
                "  #{:<3} {}  unknown ({reason})  check manually: {}",
                account.index, account.address, account.explorer_url
            )?,
        }
    }
    if report.corrected_count() > 0 {
        writeln!(
            out,
            "{} record(s) corrected from on-chain balances.",
            report.corrected_count()
        )?;
    }
    if !report.any_verified() {
        writeln!(out, "No balance could be verified. Check the accounts manually:")?;
        for account in &report.accounts {
            writeln!(out, "  {}", account.explorer_url)?;
        }
    }
    if !report.persisted {
        writeln!(out, "Warning: the reconciled batch could not be saved.")?;
    }
    Ok(())
}
