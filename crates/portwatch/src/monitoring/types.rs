use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability of an endpoint as shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Up,
    Down,
}

impl From<bool> for MonitorStatus {
    fn from(reachable: bool) -> Self {
        if reachable { MonitorStatus::Up } else { MonitorStatus::Down }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorStatus::Up => write!(f, "up"),
            MonitorStatus::Down => write!(f, "down"),
        }
    }
}

/// Result of a single probe.
///
/// Unreachability (refused, DNS failure, timeout) is reported here with
/// `reachable == false`; it is never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub reachable: bool,

    /// Taken when the attempt started
    pub checked_at: DateTime<Utc>,

    /// Connect time in milliseconds, for successful probes
    pub latency_ms: Option<u64>,

    /// Why the endpoint was considered down
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn up(checked_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self { reachable: true, checked_at, latency_ms: Some(latency_ms), error: None }
    }

    pub fn down(checked_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self { reachable: false, checked_at, latency_ms: None, error: Some(error.into()) }
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus::from(self.reachable)
    }
}
