use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{DispatchError, Result};
use crate::invocation::ArgumentVector;

/// Outcome of one external tool run.
///
/// A non-zero `exit_code` is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// The Execution Seam
// Routing and dispatch only ever see this trait, so a streaming or queued
// strategy can replace the process runner without touching either.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn invoke(&self, argv: &ArgumentVector) -> Result<InvocationResult>;
}

/// Runs the tool as a child process and waits for it to exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessRuntime {
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Executor for ProcessRuntime {
    async fn invoke(&self, argv: &ArgumentVector) -> Result<InvocationResult> {
        debug!("spawning: {}", argv);

        // A. Prepare the Command (no shell, args passed as-is)
        let mut command = Command::new(argv.program());
        command
            .args(argv.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        // B. Spawn
        // A missing current_dir also surfaces as NotFound; it is not the tool's fault.
        let child = command.spawn().map_err(|e| match (e.kind(), &self.working_dir) {
            (ErrorKind::NotFound, Some(dir)) if !dir.is_dir() => {
                DispatchError::WorkingDirMissing { dir: dir.clone() }
            }
            (ErrorKind::NotFound, _) => DispatchError::ToolNotFound {
                tool: argv.program().to_string(),
            },
            _ => DispatchError::Spawn(e),
        })?;

        // C. Wait, bounded only if a timeout was configured.
        // Dropping the future on timeout drops the child, which kills it.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| DispatchError::Timeout { limit })??,
            None => child.wait_with_output().await?,
        };

        // Signal-terminated children have no code.
        let result = InvocationResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        info!(
            "{} exited with code {} (stdout={} bytes, stderr={} bytes)",
            argv.program(),
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}
