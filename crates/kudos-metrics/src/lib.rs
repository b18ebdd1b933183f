//! Metrics collection and Prometheus exporter for kudos-rs.
//!
//! Provides counter names and recording helpers for the ledger, redemption,
//! and recognition engines.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize the Prometheus metrics exporter.
///
/// Starts an HTTP listener on the given address to expose metrics.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Total number of ledger credits applied.
pub const CREDITS_TOTAL: &str = "kudos_credits_total";
/// Total number of ledger debits applied.
pub const DEBITS_TOTAL: &str = "kudos_debits_total";
/// Total number of transfers applied.
pub const TRANSFERS_TOTAL: &str = "kudos_transfers_total";
/// Total points moved by transfers.
pub const POINTS_TRANSFERRED_TOTAL: &str = "kudos_points_transferred_total";
/// Total number of reward redemptions created.
pub const REDEMPTIONS_TOTAL: &str = "kudos_redemptions_total";
/// Total number of redemption refunds issued.
pub const REFUNDS_TOTAL: &str = "kudos_refunds_total";
/// Total number of recognitions created.
pub const RECOGNITIONS_TOTAL: &str = "kudos_recognitions_total";
/// Total number of monthly allocation runs.
pub const ALLOCATION_RUNS_TOTAL: &str = "kudos_allocation_runs_total";
/// Total points granted by allocation runs.
pub const ALLOCATION_POINTS_TOTAL: &str = "kudos_allocation_points_total";

// ============================================================================
// Recording Helpers
// ============================================================================

/// Record a successful credit.
#[inline]
pub fn record_credit() {
    counter!(CREDITS_TOTAL).increment(1);
}

/// Record a successful debit.
#[inline]
pub fn record_debit() {
    counter!(DEBITS_TOTAL).increment(1);
}

/// Record a successful transfer of `points`.
#[inline]
pub fn record_transfer(points: u64) {
    counter!(TRANSFERS_TOTAL).increment(1);
    counter!(POINTS_TRANSFERRED_TOTAL).increment(points);
}

/// Record a created redemption.
#[inline]
pub fn record_redemption() {
    counter!(REDEMPTIONS_TOTAL).increment(1);
}

/// Record a redemption refund.
#[inline]
pub fn record_refund() {
    counter!(REFUNDS_TOTAL).increment(1);
}

/// Record a created recognition.
#[inline]
pub fn record_recognition() {
    counter!(RECOGNITIONS_TOTAL).increment(1);
}

/// Record a completed allocation run granting `points` in total.
#[inline]
pub fn record_allocation_run(points: u64) {
    counter!(ALLOCATION_RUNS_TOTAL).increment(1);
    counter!(ALLOCATION_POINTS_TOTAL).increment(points);
}
