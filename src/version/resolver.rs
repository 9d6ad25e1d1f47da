//! Reduces catalog filenames to the current package variants
//!
//! A catalog lists every kernel module package ever published for a
//! distribution. Only the newest release line is of interest, and within it
//! one package per kernel ABI. Resolution happens in two passes:
//!
//! 1. per ABI key, keep the highest version (first seen wins on a tie)
//! 2. across all ABI keys, drop every entry below the global maximum

use indexmap::map::Entry;
use regex::Regex;
use tracing::debug;

use crate::version::types::{PackageVersion, VersionMap};

/// Turns a list of package filenames into a [`VersionMap`]
pub struct VersionResolver {
    /// `kmod-drbd-<major>.<minor>.<patch>_<abi key>-<dist/arch suffix>.rpm`
    filename_re: Regex,
}

impl VersionResolver {
    pub fn new() -> Self {
        Self {
            filename_re: Regex::new(r"^kmod-drbd-(\d+)\.(\d+)\.(\d+)_(.*)-.*\.rpm$").unwrap(),
        }
    }

    /// Parse a single filename into its ABI key and version.
    ///
    /// Returns `None` for filenames that do not follow the package naming
    /// scheme, including version components too large for a `u64`.
    pub fn parse_filename(&self, filename: &str) -> Option<(String, PackageVersion)> {
        let caps = self.filename_re.captures(filename)?;

        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        let patch = caps[3].parse().ok()?;

        Some((
            caps[4].to_string(),
            PackageVersion::new(major, minor, patch, filename),
        ))
    }

    /// Resolve filenames to the newest release line, one entry per ABI key.
    ///
    /// Filenames that do not match are skipped and have no effect on the
    /// result. Several ABI keys tied at the maximum version are all kept.
    pub fn resolve<S: AsRef<str>>(&self, filenames: &[S]) -> VersionMap {
        let mut have = VersionMap::new();

        for filename in filenames {
            let filename = filename.as_ref();
            let Some((abi_key, candidate)) = self.parse_filename(filename) else {
                debug!("Skipping unrecognized package filename: {}", filename);
                continue;
            };

            match have.entry(abi_key) {
                Entry::Occupied(mut existing) => {
                    if candidate > *existing.get() {
                        existing.insert(candidate);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                }
            }
        }

        let max = have
            .values()
            .max()
            .cloned()
            .unwrap_or_else(PackageVersion::zero);

        have.retain(|_, version| *version >= max);
        have
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new()
    }
}
