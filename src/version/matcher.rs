//! Kernel-to-package matching abstraction

#[cfg(test)]
use mockall::automock;

use crate::version::error::MatcherError;

/// Trait for picking the package that fits a running kernel
///
/// Implementations are expected to be deterministic: the same distribution,
/// kernel release and candidates always produce the same answer, which is
/// what makes caching their results sound.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait KernelMatcher: Send + Sync {
    /// Select the best-fit package filename among `candidates`
    ///
    /// # Arguments
    /// * `distribution` - Canonical distribution code (e.g., "rhel8")
    /// * `kernel_release` - Kernel release string as reported by `uname -r`
    /// * `candidates` - Package filenames from the current version map
    ///
    /// # Returns
    /// * `Ok(String)` - The selected package filename
    /// * `Err(MatcherError::NoMatch)` - No candidate fits the kernel
    async fn best_match(
        &self,
        distribution: &str,
        kernel_release: &str,
        candidates: &[String],
    ) -> Result<String, MatcherError>;
}
