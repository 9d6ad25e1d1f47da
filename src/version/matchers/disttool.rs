//! Matcher backed by the external distribution tool
//!
//! The tool is a script that knows how kernel module packages map onto
//! distribution kernels. It is invoked as
//! `<interpreter> <script> --force-name <dist> --force-kernel-release <kr> -k <candidates...>`
//! and prints the chosen filename on stdout. It exits non-zero when nothing
//! fits.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::MatcherConfig;
use crate::version::error::MatcherError;
use crate::version::matcher::KernelMatcher;

pub struct DistToolMatcher {
    interpreter: String,
    script: String,
}

impl DistToolMatcher {
    pub fn new(interpreter: &str, script: &str) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            script: script.to_string(),
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(&config.interpreter, &config.script)
    }

    /// Resolve the script to a full path via PATH
    fn locate_script(&self) -> Result<PathBuf, MatcherError> {
        which::which(&self.script).map_err(|e| {
            debug!("Failed to locate {}: {}", self.script, e);
            MatcherError::ToolNotFound(self.script.clone())
        })
    }
}

#[async_trait::async_trait]
impl KernelMatcher for DistToolMatcher {
    async fn best_match(
        &self,
        distribution: &str,
        kernel_release: &str,
        candidates: &[String],
    ) -> Result<String, MatcherError> {
        let script = self.locate_script()?;

        info!(
            "{} {} --force-name {} --force-kernel-release {} -k {}",
            self.interpreter,
            script.display(),
            distribution,
            kernel_release,
            candidates.join(" ")
        );

        let output = Command::new(&self.interpreter)
            .arg(&script)
            .args(["--force-name", distribution])
            .args(["--force-kernel-release", kernel_release])
            .arg("-k")
            .args(candidates)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let diagnostic = if stderr.is_empty() {
                format!("{} exited with {}", self.script, output.status)
            } else {
                stderr
            };
            return Err(MatcherError::NoMatch { diagnostic });
        }

        let hit = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if hit.is_empty() {
            return Err(MatcherError::NoMatch {
                diagnostic: format!("{} printed no package", self.script),
            });
        }

        Ok(hit)
    }
}
