//! Source trait for fetching the package catalog

#[cfg(test)]
use mockall::automock;

use crate::version::catalog::Catalog;
use crate::version::error::CatalogError;

/// Trait for fetching the remote package catalog
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Location the catalog is fetched from, for logging
    fn location(&self) -> String;

    /// Fetches and decodes the catalog
    ///
    /// A single round trip with no caching or retry.
    ///
    /// # Returns
    /// * `Ok(Catalog)` - The decoded catalog tree
    /// * `Err(CatalogError)` - Network failure, unexpected status, or malformed document
    async fn fetch(&self) -> Result<Catalog, CatalogError>;
}
