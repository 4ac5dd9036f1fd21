use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runtime::ProcessRuntime;

pub const DEFAULT_TOOL: &str = "octave";
pub const DEFAULT_SCRIPT: &str = "Table.m";

/// Which tool to run and how to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub tool: String,
    pub script: String,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            working_dir: None,
            timeout: None,
        }
    }
}

impl ToolConfig {
    /// Reads `.env` (if any) and the `BENCHOP_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tool = lookup("BENCHOP_TOOL").unwrap_or_else(|| DEFAULT_TOOL.to_string());
        let script = lookup("BENCHOP_SCRIPT").unwrap_or_else(|| DEFAULT_SCRIPT.to_string());
        if tool.trim().is_empty() {
            return Err(anyhow!("BENCHOP_TOOL must not be empty"));
        }
        if script.trim().is_empty() {
            return Err(anyhow!("BENCHOP_SCRIPT must not be empty"));
        }

        let working_dir = lookup("BENCHOP_WORKDIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        if let Some(dir) = &working_dir {
            let meta = std::fs::metadata(dir)
                .with_context(|| format!("BENCHOP_WORKDIR '{}' is not accessible", dir.display()))?;
            if !meta.is_dir() {
                return Err(anyhow!("BENCHOP_WORKDIR '{}' is not a directory", dir.display()));
            }
        }

        let timeout = match lookup("BENCHOP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("BENCHOP_TIMEOUT_SECS is not a number: '{}'", raw))?;
                if secs == 0 {
                    return Err(anyhow!("BENCHOP_TIMEOUT_SECS must be greater than zero"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let config = Self {
            tool,
            script,
            working_dir,
            timeout,
        };
        config.check_script();
        Ok(config)
    }

    /// Sanity check only: the tool may resolve the script on its own path.
    fn check_script(&self) {
        let base = self.working_dir.as_deref().unwrap_or_else(|| Path::new("."));
        if !base.join(&self.script).exists() {
            tracing::warn!(
                "Script '{}' not found under '{}'; relying on '{}' to resolve it",
                self.script,
                base.display(),
                self.tool
            );
        }
    }

    /// Process runner configured with this tool's working directory and timeout.
    pub fn runtime(&self) -> ProcessRuntime {
        let mut runtime = ProcessRuntime::new();
        if let Some(dir) = &self.working_dir {
            runtime = runtime.with_working_dir(dir);
        }
        if let Some(timeout) = self.timeout {
            runtime = runtime.with_timeout(timeout);
        }
        runtime
    }
}
