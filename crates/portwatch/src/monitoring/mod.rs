/// Monitoring engine module - probes endpoints and sweeps the registry
///
/// This module is responsible for:
/// - Executing TCP reachability probes
/// - Running sweeps over every stored resource
/// - Scheduling recurring sweeps
pub mod checker;
pub mod scheduler;
pub mod sweep;
pub mod types;

pub use checker::{DEFAULT_PROBE_TIMEOUT, Prober, TcpProber};
pub use scheduler::SweepScheduler;
pub use sweep::{DEFAULT_SWEEP_CONCURRENCY, SweepEngine, SweepOutcome, SweepReport};
pub use types::{MonitorStatus, ProbeOutcome};
