use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::checker::Prober;
use crate::alert::{AlertNotifier, AlertSignal, SweepTrigger};
use crate::models::Resource;
use crate::storage::ResourceStore;

/// Default number of probes in flight during a sweep
pub const DEFAULT_SWEEP_CONCURRENCY: usize = 8;

/// Tally of one completed sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub trigger: SweepTrigger,
    pub checked: usize,
    pub up: usize,
    pub down: usize,
    /// Resources whose probe or store update failed; they were left untouched
    pub failed: usize,
    pub duration_ms: u64,
}

impl SweepReport {
    fn new(trigger: SweepTrigger) -> Self {
        Self { trigger, checked: 0, up: 0, down: 0, failed: 0, duration_ms: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Another sweep was still running
    Skipped,
    Completed(SweepReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Up,
    Down,
    Failed,
}

/// Shared handles each per-resource task needs
#[derive(Clone)]
struct SweepContext {
    store: Arc<ResourceStore>,
    prober: Arc<dyn Prober>,
    notifier: Arc<dyn AlertNotifier>,
}

impl SweepContext {
    async fn check(self, resource: Resource, trigger: SweepTrigger) -> CheckStatus {
        let identity = resource.identity();
        debug!(resource = %identity, "Checking resource");

        let outcome = match self.prober.probe(&identity.url, identity.port).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(resource = %identity, "Error checking resource: {}", e);
                return CheckStatus::Failed;
            }
        };

        if let Err(e) = self.store.record_probe_result(&identity, &outcome).await {
            error!(resource = %identity, "Failed to record probe result: {}", e);
            return CheckStatus::Failed;
        }

        if outcome.reachable {
            return CheckStatus::Up;
        }

        warn!(
            resource = %identity,
            reason = outcome.error.as_deref().unwrap_or("unknown"),
            "Resource unreachable"
        );
        self.notifier.notify(&AlertSignal::down(identity, outcome.checked_at, trigger));
        CheckStatus::Down
    }
}

/// Probes every stored resource and folds the results into the store.
///
/// Holds no state between sweeps apart from the "sweep in progress" flag.
pub struct SweepEngine {
    context: SweepContext,
    concurrency: usize,
    in_progress: AtomicBool,
}

/// Clears the in-progress flag however the sweep ends
struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Aborts the check task if the sweep is dropped before it finishes, so no
/// check outlives the in-progress flag
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl SweepEngine {
    pub fn new(
        store: Arc<ResourceStore>,
        prober: Arc<dyn Prober>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        Self {
            context: SweepContext { store, prober, notifier },
            concurrency: DEFAULT_SWEEP_CONCURRENCY,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Limit the number of concurrent probes (1 probes sequentially)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one full pass over the stored resources.
    ///
    /// Returns `Skipped` without touching anything if a sweep is already in
    /// flight. A failure on one resource is logged and counted; it never stops
    /// the others.
    pub async fn run_sweep(&self, trigger: SweepTrigger) -> SweepOutcome {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(%trigger, "Sweep already in progress, skipping");
            return SweepOutcome::Skipped;
        }
        let _in_progress = InProgress(&self.in_progress);

        let start = Instant::now();
        let mut report = SweepReport::new(trigger);

        let resources = self.context.store.list().await;
        if resources.is_empty() {
            info!("No resources to check");
            return SweepOutcome::Completed(report);
        }

        info!(%trigger, resources = resources.len(), "Starting sweep");

        // Each check runs as its own task so a panic stays contained to one resource.
        let mut checks = stream::iter(resources)
            .map(|resource| {
                let context = self.context.clone();
                let identity = resource.identity();
                let mut task = AbortOnDrop(tokio::spawn(context.check(resource, trigger)));
                async move { (identity, (&mut task.0).await) }
            })
            .buffer_unordered(self.concurrency);

        while let Some((identity, joined)) = checks.next().await {
            report.checked += 1;
            match joined {
                Ok(CheckStatus::Up) => report.up += 1,
                Ok(CheckStatus::Down) => report.down += 1,
                Ok(CheckStatus::Failed) => report.failed += 1,
                Err(e) => {
                    error!(resource = %identity, "Check task aborted: {}", e);
                    report.failed += 1;
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            %trigger,
            checked = report.checked,
            up = report.up,
            down = report.down,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Sweep completed"
        );

        SweepOutcome::Completed(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::models::Identity;
    use crate::monitoring::types::ProbeOutcome;
    use crate::storage::MemoryBlobStore;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Prober answering from a fixed set of reachable ports
    struct ScriptedProber {
        up_ports: HashSet<u16>,
        panic_port: Option<u16>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, _host: &str, port: u16) -> Result<ProbeOutcome, ProbeError> {
            tokio::time::sleep(self.delay).await;
            if Some(port) == self.panic_port {
                panic!("network layer blew up");
            }
            if port == 9 {
                return Err(ProbeError::Transport("socket allocation failed".into()));
            }
            if self.up_ports.contains(&port) {
                Ok(ProbeOutcome::up(Utc::now(), 1))
            } else {
                Ok(ProbeOutcome::down(Utc::now(), "refused"))
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        signals: Mutex<Vec<AlertSignal>>,
    }

    impl AlertNotifier for RecordingNotifier {
        fn notify(&self, signal: &AlertSignal) {
            self.signals.lock().unwrap().push(signal.clone());
        }
    }

    async fn store_with_ports(ports: &[u16]) -> Arc<ResourceStore> {
        let store = Arc::new(ResourceStore::new(Arc::new(MemoryBlobStore::new())));
        for port in ports {
            store.upsert(Resource::new("host.example", "other", *port), None).await.unwrap();
        }
        store
    }

    fn prober(up: &[u16]) -> ScriptedProber {
        ScriptedProber { up_ports: up.iter().copied().collect(), panic_port: None, delay: Duration::ZERO }
    }

    #[tokio::test]
    async fn test_empty_store_completes_without_side_effects() {
        let store = store_with_ports(&[]).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = SweepEngine::new(store, Arc::new(prober(&[])), notifier.clone());

        let outcome = engine.run_sweep(SweepTrigger::Scheduled).await;

        let SweepOutcome::Completed(report) = outcome else { panic!("sweep skipped") };
        assert_eq!(report.checked, 0);
        assert!(notifier.signals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_results_update_every_resource() {
        let store = store_with_ports(&[80, 81, 82, 83]).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = SweepEngine::new(store.clone(), Arc::new(prober(&[80, 82])), notifier.clone())
            .with_concurrency(2);

        let SweepOutcome::Completed(report) = engine.run_sweep(SweepTrigger::UserInitiated).await else {
            panic!("sweep skipped")
        };
        assert_eq!((report.checked, report.up, report.down, report.failed), (4, 2, 2, 0));

        for resource in store.list().await {
            assert_eq!(resource.status, resource.port == 80 || resource.port == 82);
            assert_eq!(resource.status_history.len(), 1);
        }

        let alerted: HashSet<u16> =
            notifier.signals.lock().unwrap().iter().map(|s| s.resource.port).collect();
        assert_eq!(alerted, HashSet::from([81, 83]));
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_resource() {
        let store = store_with_ports(&[9, 80, 666]).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let prober = ScriptedProber { panic_port: Some(666), ..prober(&[80]) };
        let engine = SweepEngine::new(store.clone(), Arc::new(prober), notifier.clone());

        let SweepOutcome::Completed(report) = engine.run_sweep(SweepTrigger::Scheduled).await else {
            panic!("sweep skipped")
        };
        assert_eq!((report.checked, report.up, report.failed), (3, 1, 2));

        let healthy = store.get(&Identity::new("host.example", 80)).await.unwrap();
        assert!(healthy.status);
        let broken = store.get(&Identity::new("host.example", 9)).await.unwrap();
        assert!(broken.status_history.is_empty());
        assert!(notifier.signals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_sweep_is_skipped() {
        let store = store_with_ports(&[80]).await;
        let prober = ScriptedProber { delay: Duration::from_millis(200), ..prober(&[80]) };
        let engine = Arc::new(SweepEngine::new(store, Arc::new(prober), Arc::new(RecordingNotifier::default())));

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run_sweep(SweepTrigger::Scheduled).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(engine.is_running());

        assert_eq!(engine.run_sweep(SweepTrigger::UserInitiated).await, SweepOutcome::Skipped);
        assert!(matches!(first.await.unwrap(), SweepOutcome::Completed(_)));
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn test_dropped_sweep_leaves_no_checks_running() {
        let store = store_with_ports(&[80, 81]).await;
        let prober = ScriptedProber { delay: Duration::from_millis(200), ..prober(&[80]) };
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = SweepEngine::new(store.clone(), Arc::new(prober), notifier.clone());

        let cut_short =
            tokio::time::timeout(Duration::from_millis(50), engine.run_sweep(SweepTrigger::Scheduled)).await;
        assert!(cut_short.is_err());
        assert!(!engine.is_running());

        tokio::time::sleep(Duration::from_millis(400)).await;
        for resource in store.list().await {
            assert!(resource.status_history.is_empty(), "check for {} outlived its sweep", resource.port);
        }
        assert!(notifier.signals.lock().unwrap().is_empty());
    }
}
