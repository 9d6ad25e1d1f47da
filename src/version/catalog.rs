//! Remote package catalog document
//!
//! The published index is a JSON tree of
//! `content.<distribution>.<repository>.<architecture>.kmp`, where `kmp` is
//! the list of kernel module package filenames. Sibling metadata members
//! (`idx`, `location`, ...) are ignored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::version::error::CatalogError;

/// architecture -> package filenames
type ArchIndex = HashMap<String, Vec<String>>;
/// repository -> architecture index
type RepoIndex = HashMap<String, ArchIndex>;

#[derive(Debug, Default, Deserialize)]
struct About {
    created: Option<DateTime<Utc>>,
}

/// Wire shape of the catalog document
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogDocument {
    #[serde(default)]
    about: About,
    content: HashMap<String, Value>,
}

/// Parsed catalog: distribution -> repository -> architecture -> filenames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub created: Option<DateTime<Utc>>,
    content: HashMap<String, RepoIndex>,
}

impl Catalog {
    /// Decode a catalog from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_slice(bytes)
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(document.into())
    }

    /// Package filenames for a distribution/repository/architecture.
    ///
    /// Unknown combinations yield an empty list.
    pub fn filenames(&self, distribution: &str, repository: &str, architecture: &str) -> &[String] {
        self.content
            .get(distribution)
            .and_then(|repos| repos.get(repository))
            .and_then(|arches| arches.get(architecture))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distribution codes present in the catalog
    pub fn distributions(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }
}

impl From<CatalogDocument> for Catalog {
    fn from(document: CatalogDocument) -> Self {
        let mut content = HashMap::new();

        for (distribution, node) in document.content {
            let Value::Object(repos) = node else {
                continue;
            };

            let mut repo_index = RepoIndex::new();
            for (repository, node) in repos {
                let Value::Object(arches) = node else {
                    continue;
                };

                let arch_index: ArchIndex = arches
                    .into_iter()
                    .filter_map(|(arch, node)| package_list(&node).map(|kmps| (arch, kmps)))
                    .collect();
                repo_index.insert(repository, arch_index);
            }
            content.insert(distribution, repo_index);
        }

        Self {
            created: document.about.created,
            content,
        }
    }
}

fn package_list(node: &Value) -> Option<Vec<String>> {
    let kmps = node.get("kmp")?.as_array()?;
    Some(
        kmps.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
    )
}
