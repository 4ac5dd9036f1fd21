//! Error taxonomy for the command dispatcher.
//!
//! A tool that runs and exits non-zero is not an error here: that outcome is
//! carried as data on [`InvocationResult`](crate::runtime::InvocationResult).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("external tool '{tool}' could not be found on the execution path")]
    ToolNotFound { tool: String },

    #[error("invalid problem identifier '{problem}': {reason}")]
    InvalidProblemIdentifier { problem: String, reason: &'static str },

    #[error("invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: &'static str },

    #[error("external tool did not finish within {limit:?} and was killed")]
    Timeout { limit: Duration },

    #[error("working directory '{}' does not exist or is not a directory", dir.display())]
    WorkingDirMissing { dir: PathBuf },

    #[error("failed to run external tool: {0}")]
    Spawn(#[from] std::io::Error),
}

impl DispatchError {
    /// Stable machine-readable kind, used as the `error` field of HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ToolNotFound { .. } => "tool_not_found",
            DispatchError::InvalidProblemIdentifier { .. } => "invalid_problem",
            DispatchError::InvalidParameter { .. } => "invalid_parameter",
            DispatchError::Timeout { .. } => "timeout",
            DispatchError::WorkingDirMissing { .. } => "working_dir_missing",
            DispatchError::Spawn(_) => "spawn_failed",
        }
    }

    /// True when the caller sent something we refused before spawning anything.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DispatchError::InvalidProblemIdentifier { .. } | DispatchError::InvalidParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = DispatchError::ToolNotFound { tool: "octave".to_string() };
        assert_eq!(err.kind(), "tool_not_found");
        assert!(!err.is_client_error());

        let err = DispatchError::InvalidProblemIdentifier {
            problem: "-x".to_string(),
            reason: "must not begin with '-'",
        };
        assert_eq!(err.kind(), "invalid_problem");
        assert!(err.is_client_error());

        let err = DispatchError::Timeout {
            limit: Duration::from_secs(3),
        };
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_display() {
        let err = DispatchError::InvalidParameter {
            key: "K".to_string(),
            reason: "contains a NUL byte",
        };
        assert_eq!(err.to_string(), "invalid parameter 'K': contains a NUL byte");
    }

    #[test]
    fn test_timeout_display_keeps_sub_second_limits() {
        let err = DispatchError::Timeout {
            limit: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "external tool did not finish within 200ms and was killed");
    }

    #[test]
    fn test_io_error_converts_to_spawn() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DispatchError = io.into();
        assert_eq!(err.kind(), "spawn_failed");
    }
}
