//! Alert signals raised when a probe finds a resource down.
//!
//! The core decides when to alert and with what payload; delivery (toast,
//! sound) belongs to whichever `AlertNotifier` the embedder plugs in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::models::Identity;

/// What started the probe that produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SweepTrigger {
    /// Timer-driven background sweep
    Scheduled,
    /// Explicitly requested by the user
    UserInitiated,
}

impl SweepTrigger {
    /// Only user-requested checks may interrupt with an interactive toast
    pub fn is_interactive(self) -> bool {
        matches!(self, SweepTrigger::UserInitiated)
    }
}

impl std::fmt::Display for SweepTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepTrigger::Scheduled => write!(f, "scheduled"),
            SweepTrigger::UserInitiated => write!(f, "userInitiated"),
        }
    }
}

/// Notification event for an unreachable resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSignal {
    pub resource: Identity,
    pub reachable: bool,
    pub checked_at: DateTime<Utc>,
    /// Toast plus sound when true, sound only otherwise
    pub interactive: bool,
    pub trigger: SweepTrigger,
}

impl AlertSignal {
    pub fn down(resource: Identity, checked_at: DateTime<Utc>, trigger: SweepTrigger) -> Self {
        Self { resource, reachable: false, checked_at, interactive: trigger.is_interactive(), trigger }
    }
}

/// Consumer of alert signals
pub trait AlertNotifier: Send + Sync {
    fn notify(&self, signal: &AlertSignal);
}

/// Logs every alert and does nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn notify(&self, signal: &AlertSignal) {
        warn!(
            resource = %signal.resource,
            interactive = signal.interactive,
            trigger = %signal.trigger,
            "Resource unreachable"
        );
    }
}

/// Fans alerts out to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<AlertSignal>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertSignal> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl AlertNotifier for BroadcastNotifier {
    fn notify(&self, signal: &AlertSignal) {
        // No receivers is fine: nobody is listening for alerts right now.
        if self.tx.send(signal.clone()).is_err() {
            debug!(resource = %signal.resource, "Alert dropped, no subscribers");
        }
    }
}
