use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::blob::BlobStore;
use crate::error::StoreError;
use crate::models::{DEFAULT_HISTORY_LIMIT, Identity, Resource};
use crate::monitoring::types::ProbeOutcome;

/// Blob key holding the JSON array of resources
pub const RESOURCES_KEY: &str = "resources";

/// Durable registry of monitored endpoints.
///
/// All writers go through `write_lock`, so concurrent probes folding results
/// into the collection never lose each other's updates.
pub struct ResourceStore {
    blob: Arc<dyn BlobStore>,
    history_limit: usize,
    write_lock: Mutex<()>,
}

impl ResourceStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self { blob, history_limit: DEFAULT_HISTORY_LIMIT, write_lock: Mutex::new(()) }
    }

    /// Override the per-resource history bound (at least one entry is kept)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// All resources in insertion order.
    ///
    /// Best effort: an unreadable or corrupt document is logged and reads as
    /// an empty collection.
    pub async fn list(&self) -> Vec<Resource> {
        match self.load().await {
            Ok(resources) => resources,
            Err(e) => {
                warn!("Failed to read resources, treating store as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up a single resource by identity
    pub async fn get(&self, identity: &Identity) -> Option<Resource> {
        self.list().await.into_iter().find(|resource| resource.matches(identity))
    }

    /// All resources, failing on an unreadable document instead of hiding it
    pub async fn try_list(&self) -> Result<Vec<Resource>, StoreError> {
        self.load().await
    }

    /// Strict counterpart of [`ResourceStore::get`]
    pub async fn try_get(&self, identity: &Identity) -> Result<Option<Resource>, StoreError> {
        Ok(self.load().await?.into_iter().find(|resource| resource.matches(identity)))
    }

    /// Insert a resource, or replace the one at `index`.
    ///
    /// Fails with `DuplicateResource` when another record (at any position
    /// other than `index`) already has the same url and port; nothing is
    /// written in that case.
    ///
    /// Replacing a record without changing its url and port keeps the stored
    /// status, history and unknown fields; only probe results move those.
    pub async fn upsert(&self, mut resource: Resource, index: Option<usize>) -> Result<(), StoreError> {
        resource.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut resources = self.load().await?;
        let identity = resource.identity();

        if let Some(current) = index.and_then(|index| resources.get(index)) {
            if current.matches(&identity) {
                resource.status = current.status;
                resource.last_checked = current.last_checked;
                resource.status_history = current.status_history.clone();
                for (key, value) in &current.extra {
                    resource.extra.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }

        self.place(&mut resources, resource, index)?;
        self.save(&resources).await?;

        match index {
            Some(index) => info!(resource = %identity, index, "Resource updated"),
            None => info!(resource = %identity, "Resource added"),
        }
        Ok(())
    }

    /// Remove the resource with this identity. Removing a missing one is a no-op.
    ///
    /// Returns the number of records removed.
    pub async fn delete(&self, identity: &Identity) -> Result<usize, StoreError> {
        self.remove_where(|resource| resource.matches(identity)).await
    }

    /// Remove every resource on `url`, whatever its port
    pub async fn delete_host(&self, url: &str) -> Result<usize, StoreError> {
        self.remove_where(|resource| resource.url == url).await
    }

    /// Drop the whole collection, including an unreadable one
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.save(&[]).await?;
        info!("Resource store cleared");
        Ok(())
    }

    /// Fold a probe outcome into the stored record and return the new state.
    ///
    /// The only path that grows status history. Older documents may hold the
    /// same url and port more than once; every such record gets the outcome.
    pub async fn record_probe_result(
        &self,
        identity: &Identity,
        outcome: &ProbeOutcome,
    ) -> Result<Resource, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut resources = self.load().await?;

        let mut updated = None;
        for resource in resources.iter_mut().filter(|resource| resource.matches(identity)) {
            resource.apply_probe(outcome, self.history_limit);
            updated.get_or_insert_with(|| resource.clone());
        }
        let updated = updated
            .ok_or_else(|| StoreError::NotFound { url: identity.url.clone(), port: identity.port })?;

        self.save(&resources).await?;

        debug!(
            resource = %identity,
            reachable = outcome.reachable,
            history = updated.status_history.len(),
            "Probe result recorded"
        );
        Ok(updated)
    }

    /// Uniqueness check plus insert/replace on an in-memory collection
    fn place(
        &self,
        resources: &mut Vec<Resource>,
        mut resource: Resource,
        index: Option<usize>,
    ) -> Result<(), StoreError> {
        if let Some(index) = index {
            if index >= resources.len() {
                return Err(StoreError::IndexOutOfRange { index, len: resources.len() });
            }
        }

        let identity = resource.identity();
        let collision = resources
            .iter()
            .enumerate()
            .any(|(position, existing)| existing.matches(&identity) && Some(position) != index);
        if collision {
            return Err(StoreError::DuplicateResource { url: identity.url, port: identity.port });
        }

        while resource.status_history.len() > self.history_limit {
            resource.status_history.pop_front();
        }

        match index {
            Some(index) => resources[index] = resource,
            None => resources.push(resource),
        }
        Ok(())
    }

    async fn remove_where<F>(&self, predicate: F) -> Result<usize, StoreError>
    where
        F: Fn(&Resource) -> bool,
    {
        let _guard = self.write_lock.lock().await;
        let mut resources = self.load().await?;

        let before = resources.len();
        resources.retain(|resource| !predicate(resource));
        let removed = before - resources.len();

        if removed > 0 {
            self.save(&resources).await?;
            info!(removed, "Resources deleted");
        } else {
            debug!("Delete matched no resources");
        }
        Ok(removed)
    }

    /// Strict read used by writers, so a corrupt document is never silently replaced
    async fn load(&self) -> Result<Vec<Resource>, StoreError> {
        match self.blob.get(RESOURCES_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn save(&self, resources: &[Resource]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(resources)?;
        self.blob.set(RESOURCES_KEY, raw).await
    }
}
