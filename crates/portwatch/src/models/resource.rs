use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::monitoring::types::ProbeOutcome;
use crate::validation;

/// Number of status entries kept per resource unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Identity of a monitored endpoint. Unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub url: String,
    pub port: u16,
}

impl Identity {
    pub fn new(url: impl Into<String>, port: u16) -> Self {
        Self { url: url.into(), port }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.url, self.port)
    }
}

/// One past probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: bool,
    pub timestamp: DateTime<Utc>,
}

/// A monitored endpoint as persisted under the `resources` key.
///
/// Fields this version does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub url: String,

    /// Descriptive protocol label; does not affect probing
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,

    /// Last known reachability
    #[serde(default)]
    pub status: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status_history: VecDeque<StatusEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Create a never-probed resource
    pub fn new(url: impl Into<String>, kind: impl Into<String>, port: u16) -> Self {
        Self {
            url: url.into(),
            kind: kind.into(),
            port,
            status: false,
            last_checked: None,
            status_history: VecDeque::new(),
            extra: Map::new(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.url.clone(), self.port)
    }

    pub fn matches(&self, identity: &Identity) -> bool {
        self.url == identity.url && self.port == identity.port
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_endpoint(&self.url, i64::from(self.port)).map(|_| ())
    }

    /// Fold a probe outcome into the record.
    ///
    /// Status and last-checked are overwritten; one history entry is appended
    /// and the oldest entries are evicted once `limit` is exceeded.
    pub fn apply_probe(&mut self, outcome: &ProbeOutcome, limit: usize) {
        self.status = outcome.reachable;
        self.last_checked = Some(outcome.checked_at);

        self.status_history.push_back(StatusEntry {
            status: outcome.reachable,
            timestamp: outcome.checked_at,
        });
        while self.status_history.len() > limit {
            self.status_history.pop_front();
        }
    }

    /// Share of recorded probes that found the endpoint up, in percent
    pub fn uptime_percentage(&self) -> Option<f64> {
        if self.status_history.is_empty() {
            return None;
        }
        let up = self.status_history.iter().filter(|entry| entry.status).count();
        Some(up as f64 / self.status_history.len() as f64 * 100.0)
    }

    /// Number of recorded probes that found the endpoint down
    pub fn downtime_count(&self) -> usize {
        self.status_history.iter().filter(|entry| !entry.status).count()
    }
}

/// Ports were historically stored as form text, so accept `80` and `"80"`.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(i64),
        Text(String),
    }

    let port = match RawPort::deserialize(deserializer)? {
        RawPort::Number(value) => validation::validate_port(value),
        RawPort::Text(text) => validation::parse_port(&text),
    };
    port.map_err(serde::de::Error::custom)
}
