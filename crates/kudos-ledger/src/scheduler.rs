//! Recurring timer loop for the allocation job.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::allocation::run_monthly_allocation;
use crate::engine::Ledger;

/// Spawn the recurring allocation loop.
///
/// The ledger stays wall-clock-agnostic: `period` comes from configuration
/// (one month by default) and the first run happens one full period after
/// startup, so restarting the service does not double-credit. The task ends
/// when `shutdown` is cancelled.
pub fn spawn_allocation_scheduler(
    ledger: Ledger,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; consume the first tick
        ticker.tick().await;

        info!(period_secs = period.as_secs(), "allocation scheduler started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("allocation scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = run_monthly_allocation(&ledger).await {
                        error!(error = %e, "allocation run failed");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use kudos_core::{NewUser, Role};
    use kudos_store::{MemoryStore, Store};

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_runs_on_period_and_stops_on_cancel() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(NewUser {
                email: "a@example.com".into(),
                first_name: "Barbara".into(),
                last_name: "Liskov".into(),
                department: "Research".into(),
                role: Role::Employee,
                points_balance: 0,
                monthly_allocation: 100,
            })
            .await
            .unwrap()
            .id;

        let ledger = Ledger::new(Arc::new(store.clone()));
        let shutdown = CancellationToken::new();
        let handle =
            spawn_allocation_scheduler(ledger, Duration::from_secs(60), shutdown.clone());

        // nothing before the first period elapses
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 0);

        // one run per elapsed period
        tokio::time::sleep(Duration::from_secs(31)).await;
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 100);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
