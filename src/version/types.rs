//! Common types for resolved package versions

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use semver::Version;

/// A kernel module package version parsed from a catalog filename.
///
/// Ordering and equality only look at the numeric `major.minor.patch`
/// triple; the filename it came from is carried along but never compared.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    version: Version,
    raw_name: String,
}

impl PackageVersion {
    pub fn new(major: u64, minor: u64, patch: u64, raw_name: impl Into<String>) -> Self {
        Self {
            version: Version::new(major, minor, patch),
            raw_name: raw_name.into(),
        }
    }

    /// The lowest possible version, used as the starting point for maximum searches
    pub fn zero() -> Self {
        Self::new(0, 0, 0, String::new())
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    /// The full package filename this version was parsed from
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// ABI key to newest package version, for one distribution.
///
/// Insertion order follows the catalog order, so the candidate list handed to
/// the matcher is stable across identical catalogs.
pub type VersionMap = IndexMap<String, PackageVersion>;

/// A version map as installed in the shared state, tagged with the
/// generation it was installed at.
#[derive(Debug, Clone)]
pub struct VersionSnapshot {
    pub generation: u64,
    pub versions: Arc<VersionMap>,
}

impl VersionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Package filenames to offer to the matcher
    pub fn candidates(&self) -> Vec<String> {
        self.versions
            .values()
            .map(|v| v.raw_name().to_string())
            .collect()
    }
}
