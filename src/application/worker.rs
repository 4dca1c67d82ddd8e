use crate::application::reconciliation::ContractReconciler;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Periodic driver for the reconciliation engine: one run after a start
/// delay, then one per interval, until the shutdown signal flips. The engine
/// stays directly callable without this wrapper. Overlapping runs are ruled
/// out by construction since runs happen sequentially on this task.
pub struct ReconciliationWorker {
    reconciler: ContractReconciler,
    start_delay: Duration,
    interval: Duration,
}

impl ReconciliationWorker {
    pub fn new(reconciler: ContractReconciler, start_delay: Duration, interval: Duration) -> Self {
        Self {
            reconciler,
            start_delay,
            interval,
        }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            start_delay_secs = self.start_delay.as_secs(),
            interval_secs = self.interval.as_secs(),
            "reconciliation worker started"
        );

        tokio::select! {
            _ = tokio::time::sleep(self.start_delay) => {}
            _ = shutdown.changed() => {
                info!("reconciliation worker stopped before first run");
                return;
            }
        }

        loop {
            // Errors keep the worker alive; the next interval retries the scan.
            if let Err(err) = self.reconciler.run().await {
                error!(%err, "error occurred while checking problematic contracts");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("reconciliation worker stopped");
    }
}
