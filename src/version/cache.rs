//! Shared per-distribution version maps and response cache
//!
//! Everything lives behind one mutex scoped to the whole aggregate. The lock
//! is only ever held for a map operation; network fetches and matcher calls
//! must never run while it is held.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use crate::version::error::CacheError;
use crate::version::fingerprint::Fingerprint;
use crate::version::types::{VersionMap, VersionSnapshot};

/// Resolved package filename per request fingerprint, for one distribution
type ModuleCache = HashMap<Fingerprint, String>;

/// Trait for storing version maps and cached answers per distribution
#[cfg_attr(test, automock)]
pub trait ModuleStore: Send + Sync + 'static {
    /// Get a previously cached answer
    fn lookup(
        &self,
        distribution: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<String>, CacheError>;

    /// Cache an answer, creating the distribution's bucket if needed
    fn store(
        &self,
        distribution: &str,
        fingerprint: Fingerprint,
        package: String,
    ) -> Result<(), CacheError>;

    /// Cache an answer only if the distribution's version map is still at
    /// `generation`. Returns whether the answer was stored.
    fn store_if_current(
        &self,
        distribution: &str,
        generation: u64,
        fingerprint: Fingerprint,
        package: String,
    ) -> Result<bool, CacheError>;

    /// Install a new version map and drop every cached answer for the distribution
    fn replace(&self, distribution: &str, versions: VersionMap) -> Result<(), CacheError>;

    /// Get the current version map, if the distribution was ever populated
    fn versions_for(&self, distribution: &str) -> Result<Option<VersionSnapshot>, CacheError>;
}

#[derive(Default)]
struct StateInner {
    versions: HashMap<String, VersionSnapshot>,
    caches: HashMap<String, ModuleCache>,
    next_generation: u64,
}

/// In-memory [`ModuleStore`] shared between the refresh task and request handlers
#[derive(Default)]
pub struct SharedState {
    inner: Mutex<StateInner>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the state lock with proper error handling
    fn lock_inner(&self) -> Result<MutexGuard<'_, StateInner>, CacheError> {
        self.inner.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Distribution codes that have been populated at least once
    pub fn distributions(&self) -> Result<Vec<String>, CacheError> {
        let inner = self.lock_inner()?;
        let mut distributions: Vec<_> = inner.versions.keys().cloned().collect();
        distributions.sort();
        Ok(distributions)
    }

    /// Number of cached answers for a distribution
    pub fn cached_count(&self, distribution: &str) -> Result<usize, CacheError> {
        let inner = self.lock_inner()?;
        Ok(inner.caches.get(distribution).map_or(0, HashMap::len))
    }
}

impl ModuleStore for SharedState {
    fn lookup(
        &self,
        distribution: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<String>, CacheError> {
        let inner = self.lock_inner()?;
        Ok(inner
            .caches
            .get(distribution)
            .and_then(|cache| cache.get(fingerprint))
            .cloned())
    }

    fn store(
        &self,
        distribution: &str,
        fingerprint: Fingerprint,
        package: String,
    ) -> Result<(), CacheError> {
        let mut inner = self.lock_inner()?;
        inner
            .caches
            .entry(distribution.to_string())
            .or_default()
            .insert(fingerprint, package);
        Ok(())
    }

    fn store_if_current(
        &self,
        distribution: &str,
        generation: u64,
        fingerprint: Fingerprint,
        package: String,
    ) -> Result<bool, CacheError> {
        let mut inner = self.lock_inner()?;

        let current = inner
            .versions
            .get(distribution)
            .map(|snapshot| snapshot.generation);
        if current != Some(generation) {
            debug!(
                "Not caching {} for {}: version map changed since resolution",
                package, distribution
            );
            return Ok(false);
        }

        inner
            .caches
            .entry(distribution.to_string())
            .or_default()
            .insert(fingerprint, package);
        Ok(true)
    }

    fn replace(&self, distribution: &str, versions: VersionMap) -> Result<(), CacheError> {
        let version_count = versions.len();

        let mut inner = self.lock_inner()?;
        inner.next_generation += 1;
        let snapshot = VersionSnapshot {
            generation: inner.next_generation,
            versions: Arc::new(versions),
        };
        inner.versions.insert(distribution.to_string(), snapshot);
        inner
            .caches
            .insert(distribution.to_string(), ModuleCache::new());
        drop(inner);

        info!(
            "Installed {} package versions for {}, cache invalidated",
            version_count, distribution
        );
        Ok(())
    }

    fn versions_for(&self, distribution: &str) -> Result<Option<VersionSnapshot>, CacheError> {
        let inner = self.lock_inner()?;
        Ok(inner.versions.get(distribution).cloned())
    }
}
