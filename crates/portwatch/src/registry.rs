//! User-facing registration of endpoints.
//!
//! Adding or editing a resource probes it once so the list never shows an
//! endpoint without a known status. An unreachable endpoint is still saved;
//! the user is alerted instead.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::alert::{AlertNotifier, AlertSignal, SweepTrigger};
use crate::error::{RegistryError, StoreError, ValidationError};
use crate::models::{Identity, Resource};
use crate::monitoring::Prober;
use crate::protocols;
use crate::storage::ResourceStore;
use crate::validation;

/// Unvalidated input for a new or edited resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDraft {
    pub url: String,
    /// Protocol label; inferred from the port when blank
    pub kind: Option<String>,
    /// Taken from the protocol's conventional port when absent
    pub port: Option<i64>,
}

impl ResourceDraft {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn port(mut self, port: i64) -> Self {
        self.port = Some(port);
        self
    }

    /// Validate and resolve into a fresh resource
    pub fn resolve(&self) -> Result<Resource, ValidationError> {
        let url = self.url.trim();
        validation::validate_url(url)?;

        let kind = self.kind.as_deref().map(str::trim).filter(|kind| !kind.is_empty());
        let port = match (self.port, kind) {
            (Some(port), _) => validation::validate_port(port)?,
            (None, Some(kind)) => {
                protocols::port_for(kind).ok_or(ValidationError::InvalidPort(0))?
            }
            (None, None) => return Err(ValidationError::InvalidPort(0)),
        };
        // Table protocols are stored under their canonical lowercase label.
        let kind = match kind {
            Some(kind) if protocols::is_known(kind) => kind.to_ascii_lowercase(),
            Some(kind) => kind.to_string(),
            None => protocols::infer_type(port).to_string(),
        };

        Ok(Resource::new(url, kind, port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Added,
    Updated,
}

impl fmt::Display for SubmitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitAction::Added => write!(f, "Added"),
            SubmitAction::Updated => write!(f, "Updated"),
        }
    }
}

/// Outcome of a registration
#[derive(Debug, Clone)]
pub struct Submission {
    pub action: SubmitAction,
    pub resource: Resource,
}

/// Entry point for adding, editing and checking single resources
pub struct Registry {
    store: Arc<ResourceStore>,
    prober: Arc<dyn Prober>,
    notifier: Arc<dyn AlertNotifier>,
}

impl Registry {
    pub fn new(
        store: Arc<ResourceStore>,
        prober: Arc<dyn Prober>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        Self { store, prober, notifier }
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Validate, probe and store a resource; `index` selects the record being edited.
    ///
    /// The record is written first and the probe result is then folded in
    /// through [`ResourceStore::record_probe_result`], so results recorded by
    /// a sweep running at the same time are kept. Editing without changing
    /// url or port keeps the record's history and extra fields; changing the
    /// identity starts a fresh history.
    pub async fn submit(
        &self,
        draft: &ResourceDraft,
        index: Option<usize>,
    ) -> Result<Submission, RegistryError> {
        let resource = draft.resolve()?;
        let identity = resource.identity();

        let outcome = self.prober.probe(&identity.url, identity.port).await?;
        self.store.upsert(resource, index).await?;
        let resource = self.store.record_probe_result(&identity, &outcome).await?;

        if !outcome.reachable {
            self.notifier.notify(&AlertSignal::down(
                identity.clone(),
                outcome.checked_at,
                SweepTrigger::UserInitiated,
            ));
        }

        let action = if index.is_some() { SubmitAction::Updated } else { SubmitAction::Added };
        info!(resource = %identity, %action, reachable = outcome.reachable, "Resource submitted");

        Ok(Submission { action, resource })
    }

    /// Probe one stored resource now and record the result
    pub async fn check_now(&self, identity: &Identity) -> Result<Resource, RegistryError> {
        if self.store.try_get(identity).await?.is_none() {
            return Err(StoreError::NotFound { url: identity.url.clone(), port: identity.port }.into());
        }

        let outcome = self.prober.probe(&identity.url, identity.port).await?;
        let updated = self.store.record_probe_result(identity, &outcome).await?;

        if !outcome.reachable {
            self.notifier.notify(&AlertSignal::down(
                identity.clone(),
                outcome.checked_at,
                SweepTrigger::UserInitiated,
            ));
        }
        Ok(updated)
    }
}
