//! Shared fixtures for the portwatch integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use portwatch::{
    AlertNotifier, AlertSignal, Identity, MemoryBlobStore, ProbeError, ProbeOutcome, Prober,
    ResourceStore,
};

/// Prober that reports every endpoint up except the ones marked down
#[derive(Default)]
pub struct ScriptedProber {
    down: Mutex<HashSet<Identity>>,
}

impl ScriptedProber {
    pub fn all_up() -> Self {
        Self::default()
    }

    pub fn with_down(down: impl IntoIterator<Item = Identity>) -> Self {
        Self { down: Mutex::new(down.into_iter().collect()) }
    }

    pub fn set_down(&self, identity: Identity, is_down: bool) {
        let mut down = self.down.lock().unwrap();
        if is_down {
            down.insert(identity);
        } else {
            down.remove(&identity);
        }
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, host: &str, port: u16) -> Result<ProbeOutcome, ProbeError> {
        let identity = Identity::new(host, port);
        if self.down.lock().unwrap().contains(&identity) {
            Ok(ProbeOutcome::down(Utc::now(), "scripted failure"))
        } else {
            Ok(ProbeOutcome::up(Utc::now(), 1))
        }
    }
}

/// Notifier collecting every signal it receives
#[derive(Default)]
pub struct RecordingNotifier {
    signals: Mutex<Vec<AlertSignal>>,
}

impl RecordingNotifier {
    pub fn signals(&self) -> Vec<AlertSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl AlertNotifier for RecordingNotifier {
    fn notify(&self, signal: &AlertSignal) {
        self.signals.lock().unwrap().push(signal.clone());
    }
}

pub fn memory_store() -> Arc<ResourceStore> {
    Arc::new(ResourceStore::new(Arc::new(MemoryBlobStore::new())))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
