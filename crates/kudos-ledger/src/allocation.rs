//! Monthly allowance batch job.

use tracing::{info, warn};

use kudos_core::{AllocationReport, Result, TransactionType};

use crate::engine::Ledger;

/// Description attached to every allowance credit.
pub const ALLOCATION_DESCRIPTION: &str = "Monthly points allocation";

/// Credit every active user their configured monthly allowance.
///
/// This is a batch job, not a single transaction: each credit commits on its
/// own, and a per-user failure (a zero allowance, an account deactivated
/// mid-run) is logged and counted without blocking the rest of the batch.
pub async fn run_monthly_allocation(ledger: &Ledger) -> Result<AllocationReport> {
    info!("starting monthly points allocation");

    let users = ledger.store().list_active_users().await?;
    let mut report = AllocationReport::default();

    for user in &users {
        match ledger
            .credit(
                &user.id,
                user.monthly_allocation,
                ALLOCATION_DESCRIPTION,
                TransactionType::Allocated,
                None,
            )
            .await
        {
            Ok(outcome) => {
                report.credited += 1;
                report.points_granted += outcome.amount;
            }
            Err(e) => {
                warn!(user = %user.id, error = %e, "allocation skipped for user");
                report.failed += 1;
            }
        }
    }

    info!(
        credited = report.credited,
        failed = report.failed,
        points = report.points_granted,
        "monthly points allocation complete"
    );
    kudos_metrics::record_allocation_run(report.points_granted as u64);

    Ok(report)
}
