//! Portwatch - periodic TCP reachability monitoring
//!
//! Keeps a durable list of host:port endpoints, probes them on demand and on
//! a schedule, keeps a bounded status history per endpoint and raises alert
//! signals when an endpoint is found down.

pub mod alert;
pub mod config;
pub mod error;
pub mod models;
pub mod monitoring;
pub mod protocols;
pub mod registry;
pub mod storage;
pub mod validation;

pub use alert::{AlertNotifier, AlertSignal, BroadcastNotifier, LogNotifier, SweepTrigger};
pub use config::Config;
pub use error::{ConfigError, ProbeError, RegistryError, StoreError, ValidationError};
pub use models::{Identity, Resource, StatusEntry};
pub use monitoring::{
    MonitorStatus, ProbeOutcome, Prober, SweepEngine, SweepOutcome, SweepReport, SweepScheduler,
    TcpProber,
};
pub use registry::{Registry, ResourceDraft, SubmitAction, Submission};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore, ResourceStore};
