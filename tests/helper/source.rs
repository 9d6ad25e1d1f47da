//! Catalog source test utilities

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use best_kmod::config::{CatalogConfig, RefreshConfig, ServiceConfig};
use best_kmod::version::catalog::Catalog;
use best_kmod::version::error::CatalogError;
use best_kmod::version::source::CatalogSource;

/// Catalog source serving an in-memory document that tests can swap out
pub struct StaticCatalogSource {
    document: Mutex<Option<String>>,
    fetches: AtomicUsize,
}

impl StaticCatalogSource {
    pub fn new(document: String) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails
    pub fn failing() -> Self {
        Self {
            document: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_document(&self, document: String) {
        *self.document.lock().unwrap() = Some(document);
    }

    pub fn fail(&self) {
        *self.document.lock().unwrap() = None;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    fn location(&self) -> String {
        "memory://catalog".to_string()
    }

    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let document = self.document.lock().unwrap().clone();
        match document {
            Some(document) => Catalog::from_slice(document.as_bytes()),
            None => Err(CatalogError::InvalidResponse(
                "Unexpected status: 503 Service Unavailable".to_string(),
            )),
        }
    }
}

/// Build a catalog document with `drbd-9`/`amd64` package lists per distribution
pub fn catalog_json(distributions: &[(&str, &[&str])]) -> String {
    let content: serde_json::Map<String, serde_json::Value> = distributions
        .iter()
        .map(|(dist, kmps)| {
            (
                dist.to_string(),
                json!({
                    "idx": dist,
                    "drbd-9": {
                        "idx": "drbd-9",
                        "amd64": {
                            "idx": "amd64",
                            "location": format!("/yum/{dist}/drbd-9/x86_64"),
                            "kmp": kmps,
                        }
                    }
                }),
            )
        })
        .collect();

    json!({
        "about": { "created": "2024-05-02T10:00:00Z" },
        "content": content,
    })
    .to_string()
}

/// Service configuration tracking the given distributions, with a refresh
/// interval long enough that only explicit refreshes happen during a test
pub fn test_config(url: &str, distributions: &[&str]) -> ServiceConfig {
    ServiceConfig {
        catalog: CatalogConfig {
            url: url.to_string(),
            distributions: distributions.iter().map(|d| d.to_string()).collect(),
            ..CatalogConfig::default()
        },
        refresh: RefreshConfig {
            interval: 60 * 60 * 1000,
        },
        ..ServiceConfig::default()
    }
}
