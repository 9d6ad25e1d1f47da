//! Request path: fingerprint, cache lookup, matcher fallback
//!
//! The flow for a single request:
//!
//! 1. validate the kernel release and the payload size
//! 2. derive the fingerprint from the kernel release and raw os-release payload
//! 3. derive the distribution code from the os-release payload
//! 4. return a cached answer if there is one
//! 5. otherwise ask the matcher, outside of any lock, and cache its answer
//!    unless the version map was replaced in the meantime

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{MAX_KERNEL_RELEASE_LEN, MAX_PAYLOAD_LEN, MAX_PAYLOAD_LINE_LEN};
use crate::service::os_release::OsRelease;
use crate::version::cache::ModuleStore;
use crate::version::error::{CacheError, MatcherError};
use crate::version::fingerprint::{Fingerprint, payload_lines};
use crate::version::matcher::KernelMatcher;

/// Who is at fault for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Server,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Could not get valid kernel release parameter")]
    InvalidKernelRelease,

    #[error("os-release payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("os-release line exceeds {limit} bytes")]
    PayloadLineTooLong { limit: usize },

    #[error("Could not determine distribution from os-release")]
    MissingDistribution,

    #[error("Could not determine major release from os-release")]
    MissingMajorVersion,

    #[error("Distribution '{0}' not supported")]
    UnsupportedDistribution(String),

    #[error("No versions for distribution '{0}'")]
    NoVersions(String),

    #[error("Resolution failed: {0}")]
    Resolution(#[from] MatcherError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl RequestError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RequestError::InvalidKernelRelease
            | RequestError::PayloadTooLarge { .. }
            | RequestError::PayloadLineTooLong { .. }
            | RequestError::MissingDistribution
            | RequestError::MissingMajorVersion
            | RequestError::UnsupportedDistribution(_) => ErrorClass::Client,
            RequestError::Resolution(MatcherError::NoMatch { .. }) => ErrorClass::Client,
            RequestError::NoVersions(_)
            | RequestError::Resolution(_)
            | RequestError::Cache(_) => ErrorClass::Server,
        }
    }
}

/// Answers "which package fits this kernel" using the shared cache
pub struct KmodService<S: ModuleStore> {
    store: Arc<S>,
    matcher: Arc<dyn KernelMatcher>,
    matcher_timeout: Duration,
}

impl<S: ModuleStore> KmodService<S> {
    pub fn new(store: Arc<S>, matcher: Arc<dyn KernelMatcher>, matcher_timeout: Duration) -> Self {
        Self {
            store,
            matcher,
            matcher_timeout,
        }
    }

    /// Resolve the best package for a kernel release and os-release payload
    pub async fn best_module(
        &self,
        kernel_release: &str,
        payload: &[u8],
    ) -> Result<String, RequestError> {
        if kernel_release.is_empty() || kernel_release.len() > MAX_KERNEL_RELEASE_LEN {
            return Err(RequestError::InvalidKernelRelease);
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(RequestError::PayloadTooLarge {
                limit: MAX_PAYLOAD_LEN,
            });
        }
        if payload_lines(payload).any(|line| line.len() > MAX_PAYLOAD_LINE_LEN) {
            return Err(RequestError::PayloadLineTooLong {
                limit: MAX_PAYLOAD_LINE_LEN,
            });
        }

        let fingerprint = Fingerprint::derive(kernel_release, payload);
        let distribution = OsRelease::parse(payload).distribution_code()?;

        if let Some(hit) = self.store.lookup(&distribution, &fingerprint)? {
            info!("Cache hit for: {}", hit);
            return Ok(hit);
        }
        debug!("Cache miss for {} ({})", distribution, fingerprint);

        let snapshot = self
            .store
            .versions_for(&distribution)?
            .ok_or_else(|| RequestError::UnsupportedDistribution(distribution.clone()))?;
        if snapshot.is_empty() {
            return Err(RequestError::NoVersions(distribution));
        }

        let candidates = snapshot.candidates();
        let hit = tokio::time::timeout(
            self.matcher_timeout,
            self.matcher
                .best_match(&distribution, kernel_release, &candidates),
        )
        .await
        .map_err(|_| MatcherError::Timeout {
            timeout_ms: self.matcher_timeout.as_millis() as u64,
        })?
        .inspect_err(|e| warn!("Matcher failed for {} {}: {}", distribution, kernel_release, e))?;

        let cached = self.store.store_if_current(
            &distribution,
            snapshot.generation,
            fingerprint,
            hit.clone(),
        )?;
        if !cached {
            info!(
                "Version map for {} changed while resolving, answer not cached",
                distribution
            );
        }

        Ok(hit)
    }
}
