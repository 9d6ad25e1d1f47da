//! HTTP catalog source implementation

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{DEFAULT_CATALOG_URL, FETCH_TIMEOUT_MS};
use crate::version::catalog::{Catalog, CatalogDocument};
use crate::version::error::CatalogError;
use crate::version::source::CatalogSource;

/// Catalog source fetching the published JSON index over HTTP
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    /// Creates a new HttpCatalogSource for the given index URL
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("best-kmod")
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            url: url.to_string(),
        }
    }
}

impl Default for HttpCatalogSource {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_URL)
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalogSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        debug!("Fetching package catalog from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog server returned status {}: {}", status, self.url);
            return Err(CatalogError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let document: CatalogDocument = response.json().await.map_err(|e| {
            warn!("Failed to parse catalog response: {}", e);
            CatalogError::InvalidResponse(e.to_string())
        })?;

        Ok(document.into())
    }
}
