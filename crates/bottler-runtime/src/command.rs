//! Subprocess execution for external tools.
//!
//! Spawns a [`ToolInvocation`], captures stdout/stderr while the child runs
//! and kills it once the time bound expires. Output read before the kill
//! is still returned so trace parsing can use it.

use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bottler_core::ports::{ProvisionError, ProvisionResult, ToolInvocation, ToolOutput, ToolRunner};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long to keep draining pipes after the child was killed.
///
/// Grandchildren (e.g. a detached `wineserver`) can inherit the pipes and
/// keep them open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

type Buffer = Arc<Mutex<Vec<u8>>>;

/// Copy a pipe into a shared buffer until EOF.
fn spawn_reader<R>(mut pipe: R, buffer: Buffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..n]),
            }
        }
    })
}

fn take_text(buffer: &Buffer) -> String {
    let bytes = std::mem::take(&mut *buffer.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8_lossy(&bytes).into_owned()
}

/// [`ToolRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemToolRunner;

impl SystemToolRunner {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(&self, invocation: ToolInvocation) -> ProvisionResult<ToolOutput> {
        let Some((program, args)) = invocation.argv.split_first() else {
            return Err(ProvisionError::InvalidRequest(
                "empty command line".to_string(),
            ));
        };

        debug!(
            command = %invocation.display(),
            timeout_secs = invocation.timeout.as_secs(),
            "Running external tool"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|e| {
            warn!(program = %program, error = %e, "Failed to spawn external tool");
            if e.kind() == ErrorKind::NotFound {
                ProvisionError::ToolUnavailable(program.clone())
            } else {
                ProvisionError::ToolFailure(format!("failed to spawn {program}: {e}"))
            }
        })?;

        let stdout_buf: Buffer = Arc::default();
        let stderr_buf: Buffer = Arc::default();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, Arc::clone(&stdout_buf)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, Arc::clone(&stderr_buf)));
        }

        let (exit_code, timed_out) =
            match tokio::time::timeout(invocation.timeout, child.wait()).await {
                Ok(Ok(status)) => (status.code(), false),
                Ok(Err(e)) => {
                    warn!(program = %program, error = %e, "Failed waiting for external tool");
                    (None, false)
                }
                Err(_) => {
                    warn!(
                        command = %invocation.display(),
                        timeout_secs = invocation.timeout.as_secs(),
                        "External tool timed out, killing"
                    );
                    if let Err(e) = child.kill().await {
                        warn!(program = %program, error = %e, "Failed to kill external tool");
                    }
                    (None, true)
                }
            };

        for reader in readers {
            let abort = reader.abort_handle();
            if tokio::time::timeout(DRAIN_GRACE, reader).await.is_err() {
                abort.abort();
            }
        }

        let output = ToolOutput {
            exit_code,
            stdout: take_text(&stdout_buf),
            stderr: take_text(&stderr_buf),
            timed_out,
        };
        if !output.success() && !timed_out {
            debug!(
                program = %program,
                exit_code = ?exit_code,
                stderr = %output.stderr_excerpt(200),
                "External tool exited unsuccessfully"
            );
        }
        Ok(output)
    }
}
