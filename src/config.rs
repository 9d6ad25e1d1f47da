use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default catalog refresh interval in milliseconds (20 minutes)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 20 * 60 * 1000;

/// Timeout for catalog fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for a single external matcher invocation (30 seconds)
pub const DEFAULT_MATCHER_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Request limits
// =============================================================================

/// Longest kernel release string accepted from a request
pub const MAX_KERNEL_RELEASE_LEN: usize = 42;

/// Largest os-release payload accepted from a request (250 KiB)
pub const MAX_PAYLOAD_LEN: usize = 250 * 1024;

/// Longest single os-release line accepted from a request (64 KiB)
pub const MAX_PAYLOAD_LINE_LEN: usize = 64 * 1024;

/// Default location of the published package index
pub const DEFAULT_CATALOG_URL: &str = "https://packages.linbit.com/yum/index.kmp.json";

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "BEST_KMOD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config {path:?}: {field} must be greater than 0")]
    Invalid { path: PathBuf, field: &'static str },
}

/// Service configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    pub catalog: CatalogConfig,
    pub refresh: RefreshConfig,
    pub matcher: MatcherConfig,
}

/// Which part of the remote catalog is tracked
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub url: String,
    pub repository: String,
    pub architecture: String,
    pub distributions: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            repository: "drbd-9".to_string(),
            architecture: "amd64".to_string(),
            distributions: ["rhel7", "rhel8", "rhel9", "rhel10"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Background refresh configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshConfig {
    /// Catalog refresh interval in milliseconds
    pub interval: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

/// External distribution tool configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MatcherConfig {
    pub interpreter: String,
    /// Script name, looked up on PATH
    pub script: String,
    /// Per-invocation timeout in milliseconds
    pub timeout: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            script: "lbdisttool.py".to_string(),
            timeout: DEFAULT_MATCHER_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file is not an error; every field falls back to its default.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        match config.zero_field() {
            Some(field) => Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field,
            }),
            None => Ok(config),
        }
    }

    /// Name of the first duration field that is set to 0
    fn zero_field(&self) -> Option<&'static str> {
        if self.refresh.interval == 0 {
            Some("refresh.interval")
        } else if self.matcher.timeout == 0 {
            Some("matcher.timeout")
        } else {
            None
        }
    }
}

/// Returns the path to the data directory for best-kmod.
/// Uses $XDG_DATA_HOME/best-kmod if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/best-kmod,
/// or ./best-kmod if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the configuration file.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("config.json"))
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("best-kmod.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("best-kmod")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn service_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<ServiceConfig>(json!({
            "refresh": {
                "interval": 1000
            }
        }))
        .unwrap();

        assert_eq!(result.refresh.interval, 1000);
        assert_eq!(result.catalog, CatalogConfig::default());
        assert_eq!(result.matcher, MatcherConfig::default());
    }

    #[test]
    fn service_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<ServiceConfig>(json!({
            "catalog": {
                "url": "http://localhost:1234/index.json",
                "repository": "drbd-9.0",
                "architecture": "amd64",
                "distributions": ["rhel8"]
            },
            "refresh": { "interval": 5000 },
            "matcher": {
                "interpreter": "python3.11",
                "script": "disttool.py",
                "timeout": 100
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            ServiceConfig {
                catalog: CatalogConfig {
                    url: "http://localhost:1234/index.json".to_string(),
                    repository: "drbd-9.0".to_string(),
                    architecture: "amd64".to_string(),
                    distributions: vec!["rhel8".to_string()],
                },
                refresh: RefreshConfig { interval: 5000 },
                matcher: MatcherConfig {
                    interpreter: "python3.11".to_string(),
                    script: "disttool.py".to_string(),
                    timeout: 100,
                },
            }
        );
    }

    #[test]
    fn load_returns_defaults_when_file_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServiceConfig::load(&temp_dir.path().join("missing.json")).unwrap();

        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn load_reports_parse_error_for_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ServiceConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[rstest]
    #[case::refresh_interval(r#"{ "refresh": { "interval": 0 } }"#, "refresh.interval")]
    #[case::matcher_timeout(r#"{ "matcher": { "timeout": 0 } }"#, "matcher.timeout")]
    fn load_rejects_zero_durations(#[case] content: &str, #[case] expected: &str) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, content).unwrap();

        let result = ServiceConfig::load(&path);

        match result {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn load_accepts_nonzero_durations() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "refresh": { "interval": 1 }, "matcher": { "timeout": 1 } }"#)
            .unwrap();

        let config = ServiceConfig::load(&path).unwrap();

        assert_eq!(config.refresh.interval, 1);
        assert_eq!(config.matcher.timeout, 1);
    }

    #[test]
    #[serial]
    fn config_path_prefers_environment_override() {
        // SAFETY: serialized with the other env-mutating tests
        unsafe { std::env::set_var(CONFIG_PATH_ENV, "/etc/best-kmod.json") };
        let path = config_path();
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

        assert_eq!(path, PathBuf::from("/etc/best-kmod.json"));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/best-kmod"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/best-kmod"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./best-kmod"));
    }
}
