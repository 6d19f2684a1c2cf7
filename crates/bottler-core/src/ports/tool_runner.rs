//! Tool runner trait definition.
//!
//! This port describes running one external command to completion with a
//! time bound. Implementations handle spawning, output capture and
//! killing the child on timeout.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::ProvisionResult;

/// One external command invocation.
///
/// This is intent-based: argv, extra environment and a time bound. How the
/// process is spawned is up to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Program followed by its arguments. Never empty.
    pub argv: Vec<String>,
    /// Variables added on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Working directory, inherited when `None`.
    pub cwd: Option<PathBuf>,
    /// Upper bound on wall-clock time.
    pub timeout: Duration,
}

impl ToolInvocation {
    /// Build an invocation from a command prefix plus arguments.
    pub fn new<I, S>(prefix: &[String], args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = prefix.to_vec();
        argv.extend(args.into_iter().map(Into::into));
        Self {
            argv,
            env: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Program name (first argv element).
    pub fn program(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }

    /// Command line joined with spaces, for logs.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Captured result of a finished (or killed) command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when killed or terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The time bound was hit and the process was killed. Output is partial.
    pub timed_out: bool,
}

impl ToolOutput {
    /// Exited normally with status 0.
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0)) && !self.timed_out
    }

    /// Leading part of stderr for log lines.
    pub fn stderr_excerpt(&self, max_chars: usize) -> String {
        self.stderr.trim().chars().take(max_chars).collect()
    }
}

/// Port for executing external tools.
///
/// `Ok` is returned whenever the process was spawned, including non-zero
/// exits and timeouts (check [`ToolOutput::success`] and
/// [`ToolOutput::timed_out`]). `Err` means the process never ran:
/// `ToolUnavailable` when the program is missing, `ToolFailure` otherwise.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: ToolInvocation) -> ProvisionResult<ToolOutput>;
}
