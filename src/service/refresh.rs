//! Background refresh of per-distribution version maps

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{CatalogConfig, DEFAULT_REFRESH_INTERVAL_MS};
use crate::version::cache::ModuleStore;
use crate::version::catalog::Catalog;
use crate::version::resolver::VersionResolver;
use crate::version::source::CatalogSource;

/// Outcome of a single refresh tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Distributions whose version map was replaced
    pub updated: Vec<String>,
    /// Distributions left as they were
    pub skipped: Vec<String>,
}

/// Resolve one distribution from an already fetched catalog and install it
///
/// Returns true if the distribution's version map was replaced.
fn refresh_distribution<S: ModuleStore>(
    store: &S,
    resolver: &VersionResolver,
    catalog: &Catalog,
    selection: &CatalogConfig,
    distribution: &str,
) -> bool {
    let filenames = catalog.filenames(distribution, &selection.repository, &selection.architecture);
    if filenames.is_empty() {
        warn!(
            "No packages published for {}/{}/{}, keeping previous versions",
            distribution, selection.repository, selection.architecture
        );
        return false;
    }

    let versions = resolver.resolve(filenames);
    if versions.is_empty() {
        warn!(
            "None of {} packages for {} matched the package naming scheme",
            filenames.len(),
            distribution
        );
    }
    debug!(
        "Resolved {} packages for {} to {} current versions",
        filenames.len(),
        distribution,
        versions.len()
    );

    store
        .replace(distribution, versions)
        .inspect_err(|e| error!("Failed to install versions for {}: {}", distribution, e))
        .is_ok()
}

/// Fetch the catalog once and refresh every configured distribution
///
/// Distributions are processed sequentially. A failed fetch leaves every
/// distribution untouched; the next tick is the only retry.
pub async fn refresh_distributions<S: ModuleStore>(
    store: &S,
    source: &dyn CatalogSource,
    resolver: &VersionResolver,
    selection: &CatalogConfig,
) -> RefreshSummary {
    let catalog = match source.fetch().await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(
                "Could not fetch package catalog from {}: {}",
                source.location(),
                e
            );
            return RefreshSummary {
                updated: Vec::new(),
                skipped: selection.distributions.clone(),
            };
        }
    };

    if let Some(created) = catalog.created {
        debug!("Fetched package catalog created at {}", created);
    }

    let mut summary = RefreshSummary::default();
    for distribution in &selection.distributions {
        if refresh_distribution(store, resolver, &catalog, selection, distribution) {
            summary.updated.push(distribution.clone());
        } else {
            summary.skipped.push(distribution.clone());
        }
    }

    info!(
        "Catalog refresh done: {} updated, {} skipped",
        summary.updated.len(),
        summary.skipped.len()
    );
    summary
}

/// Periodically refreshes the shared state from the catalog
pub struct RefreshScheduler<S: ModuleStore> {
    store: Arc<S>,
    source: Arc<dyn CatalogSource>,
    resolver: VersionResolver,
    selection: CatalogConfig,
    interval: Duration,
}

impl<S: ModuleStore> RefreshScheduler<S> {
    pub fn new(
        store: Arc<S>,
        source: Arc<dyn CatalogSource>,
        selection: CatalogConfig,
        interval: Duration,
    ) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                "Refresh interval of 0 is not allowed, using {} ms",
                DEFAULT_REFRESH_INTERVAL_MS
            );
            Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS)
        } else {
            interval
        };

        Self {
            store,
            source,
            resolver: VersionResolver::new(),
            selection,
            interval,
        }
    }

    /// Run a single refresh tick
    pub async fn run_once(&self) -> RefreshSummary {
        refresh_distributions(
            &*self.store,
            &*self.source,
            &self.resolver,
            &self.selection,
        )
        .await
    }

    /// Spawn the refresh loop as a background task
    ///
    /// The first tick runs after one interval; callers that need data before
    /// serving should await [`RefreshScheduler::run_once`] first. The task
    /// ends once `cancel` is triggered, including in the middle of a tick.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Catalog refresh every {:?}", self.interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(self.interval) => {}
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = self.run_once() => {}
                }
            }
            info!("Catalog refresh stopped");
        })
    }
}
