use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::sweep::{SweepEngine, SweepOutcome};
use crate::alert::SweepTrigger;

/// Drives scheduled sweeps on a fixed period
pub struct SweepScheduler {
    engine: Arc<SweepEngine>,
    period: Duration,
}

impl SweepScheduler {
    pub fn new(engine: Arc<SweepEngine>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// Sweep immediately, then every period, until `shutdown` resolves.
    ///
    /// A sweep in progress is allowed to finish before the loop exits.
    /// Returns the number of sweeps that ran to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(period_secs = self.period.as_secs_f64(), "Sweep scheduler started");
        let mut completed = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => {
                    match self.engine.run_sweep(SweepTrigger::Scheduled).await {
                        SweepOutcome::Completed(_) => completed += 1,
                        SweepOutcome::Skipped => debug!("Scheduled sweep skipped, previous one still running"),
                    }
                }
            }
        }

        info!(sweeps = completed, "Sweep scheduler stopped");
        completed
    }

    /// Run the schedule on a background task until `shutdown` resolves
    pub fn spawn<F>(self, shutdown: F) -> tokio::task::JoinHandle<usize>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move { self.run_until(shutdown).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::LogNotifier;
    use crate::models::Resource;
    use crate::monitoring::TcpProber;
    use crate::storage::{MemoryBlobStore, ResourceStore};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_scheduler_sweeps_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let store = Arc::new(ResourceStore::new(Arc::new(MemoryBlobStore::new())));
        store.upsert(Resource::new("127.0.0.1", "other", port), None).await.unwrap();

        let engine = Arc::new(SweepEngine::new(
            store.clone(),
            Arc::new(TcpProber::new(Duration::from_secs(1))),
            Arc::new(LogNotifier),
        ));

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = SweepScheduler::new(engine, Duration::from_millis(50)).spawn(async move {
            let _ = stop_rx.await;
        });

        tokio::time::sleep(Duration::from_millis(180)).await;
        stop_tx.send(()).unwrap();
        let sweeps = handle.await.unwrap();

        assert!(sweeps >= 2, "expected repeated sweeps, got {sweeps}");
        let resource = &store.list().await[0];
        assert!(resource.status);
        assert_eq!(resource.status_history.len(), sweeps);
    }
}
