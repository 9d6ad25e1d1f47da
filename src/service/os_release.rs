//! Minimal os-release reader
//!
//! Only `ID` and `VERSION_ID` are needed to derive a distribution code.
//! Quoting is handled loosely: one quote character is stripped from each end
//! independently, which covers every os-release file seen in practice.

use crate::service::request::RequestError;
use crate::version::fingerprint::payload_lines;

/// Rebuilds that share packages with their upstream family
const RHEL_REBUILDS: &[&str] = &["centos", "almalinux", "rocky"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub version_id: String,
}

impl OsRelease {
    /// Parse an os-release payload. Later assignments override earlier ones.
    pub fn parse(payload: &[u8]) -> Self {
        let mut os_release = Self::default();

        for line in payload_lines(payload) {
            let line = String::from_utf8_lossy(line);
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            match key.trim() {
                "ID" => os_release.id = unquote(value.trim()).to_string(),
                "VERSION_ID" => os_release.version_id = unquote(value.trim()).to_string(),
                _ => {}
            }
        }

        os_release
    }

    /// Major part of `VERSION_ID` (everything before the first dot)
    pub fn major_version(&self) -> &str {
        self.version_id
            .split_once('.')
            .map_or(self.version_id.as_str(), |(major, _)| major)
    }

    /// Distribution family, with RHEL rebuilds collapsed onto `rhel`
    pub fn family(&self) -> &str {
        if RHEL_REBUILDS.contains(&self.id.as_str()) {
            "rhel"
        } else {
            &self.id
        }
    }

    /// Canonical distribution code: family followed by major version, e.g. `rhel8`
    pub fn distribution_code(&self) -> Result<String, RequestError> {
        let family = self.family();
        if family.is_empty() {
            return Err(RequestError::MissingDistribution);
        }

        let major = self.major_version();
        if major.is_empty() {
            return Err(RequestError::MissingMajorVersion);
        }

        Ok(format!("{family}{major}"))
    }
}

fn unquote(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
