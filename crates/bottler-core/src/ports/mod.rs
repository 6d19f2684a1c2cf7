//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `tokio::process` types in any signature
//! - Tool invocations are described as data, executed by the runtime crate
//! - Every failure is expressed as a [`ProvisionError`]

pub mod tool_runner;

use thiserror::Error;

pub use tool_runner::{ToolInvocation, ToolOutput, ToolRunner};

/// Error taxonomy shared by every provisioning component.
///
/// Adapters map this to their own error types (JSON-RPC codes, HTTP status
/// codes, CLI exit codes).
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// An input path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required external tool is missing on the host.
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    /// A tool ran but exited non-zero or produced unusable output.
    #[error("Tool failed: {0}")]
    ToolFailure(String),

    /// A tool exceeded its time bound.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A request is missing required arguments or names something unknown.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A resolved path escapes the environment root.
    #[error("Path outside environment: {0}")]
    PathViolation(String),

    /// Another workflow is still running for the environment.
    #[error("A workflow is already running for environment '{0}'")]
    AlreadyRunning(String),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Stable lower-case discriminant for logs and clients.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ToolUnavailable(_) => "tool_unavailable",
            Self::ToolFailure(_) => "tool_failure",
            Self::Timeout(_) => "timeout",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PathViolation(_) => "path_violation",
            Self::AlreadyRunning(_) => "already_running",
            Self::Io(_) => "io",
        }
    }
}

/// Result alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = ProvisionError::NotFound("/tmp/game.exe".to_string());
        assert_eq!(err.to_string(), "Not found: /tmp/game.exe");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ProvisionError = io.into();
        assert_eq!(err.kind(), "io");
    }
}
