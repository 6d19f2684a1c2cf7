//! CLI composition root.
//!
//! Wires the host tool runner, the detected toolchain and the orchestrator
//! for one-shot commands. `serve` goes through the gateway's own bootstrap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bottler_core::ports::ToolRunner;
use bottler_core::{PrefixBaseSource, ProvisionSettings, StatusTracker, Toolchain, resolve_prefix_base};
use bottler_runtime::{Orchestrator, SystemToolRunner, detect_or_native};

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub prefix_base: Option<String>,
}

impl CliConfig {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix_base(mut self, base: Option<String>) -> Self {
        self.prefix_base = base;
        self
    }
}

/// Everything a one-shot command needs.
pub struct CliContext {
    pub orchestrator: Orchestrator,
    pub toolchain: Toolchain,
    pub prefix_base: PathBuf,
    pub prefix_source: PrefixBaseSource,
}

/// Detect the toolchain on the host and build the orchestrator.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let runner: Arc<dyn ToolRunner> = Arc::new(SystemToolRunner::new());
    let toolchain = detect_or_native(runner.as_ref()).await;
    bootstrap_with(&config, toolchain, runner)
}

/// Build the context with an injected toolchain and runner.
pub fn bootstrap_with(
    config: &CliConfig,
    toolchain: Toolchain,
    runner: Arc<dyn ToolRunner>,
) -> Result<CliContext> {
    let resolution = resolve_prefix_base(config.prefix_base.as_deref(), toolchain.variant)?;
    let settings = ProvisionSettings::new(resolution.path.clone()).from_env();
    tracing::debug!(
        target: "bottler.paths",
        prefix_base = %resolution.path.display(),
        source = ?resolution.source,
        "CLI bootstrap resolved paths"
    );
    let orchestrator = Orchestrator::new(
        settings,
        toolchain.clone(),
        runner,
        Arc::new(StatusTracker::new()),
    );
    Ok(CliContext {
        orchestrator,
        toolchain,
        prefix_base: resolution.path,
        prefix_source: resolution.source,
    })
}
