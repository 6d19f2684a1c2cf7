//! Axum server bootstrap - the composition root.
//!
//! This module is the only place where the host tool runner, the detected
//! toolchain and the orchestrator are wired together for the gateway.

use std::sync::Arc;

use anyhow::Result;
use bottler_core::ports::ToolRunner;
use bottler_core::{ProvisionSettings, StatusTracker, Toolchain, resolve_prefix_base};
use bottler_runtime::{Orchestrator, SystemToolRunner, detect_or_native};
use tokio::net::TcpListener;
use tracing::info;

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8766;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// Parse a comma-separated origin list; blank input allows all origins.
    pub fn from_origin_list(list: &str) -> Self {
        let origins: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(ToString::to_string)
            .collect();
        if origins.is_empty() {
            Self::AllowAll
        } else {
            Self::AllowOrigins(origins)
        }
    }
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Explicit prefix base; `None` defers to env var and Bottles default.
    pub prefix_base: Option<String>,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Config with default host, port and CORS.
    pub fn with_defaults() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            prefix_base: None,
            cors: CorsConfig::default(),
        }
    }

    #[must_use]
    pub fn with_prefix_base(mut self, base: impl Into<String>) -> Self {
        self.prefix_base = Some(base.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    pub orchestrator: Arc<Orchestrator>,
    pub tracker: Arc<StatusTracker>,
}

/// Bootstrap against the host: real subprocesses and a detected toolchain.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let runner: Arc<dyn ToolRunner> = Arc::new(SystemToolRunner::new());
    let toolchain = detect_or_native(runner.as_ref()).await;
    bootstrap_with(config, toolchain, runner)
}

/// Bootstrap with an injected toolchain and runner.
pub fn bootstrap_with(
    config: &ServerConfig,
    toolchain: Toolchain,
    runner: Arc<dyn ToolRunner>,
) -> Result<AxumContext> {
    let resolution = resolve_prefix_base(config.prefix_base.as_deref(), toolchain.variant)?;
    let settings = ProvisionSettings::new(resolution.path).from_env();

    info!(
        target: "bottler.paths",
        prefix_base = %settings.prefix_base.display(),
        prefix_source = ?resolution.source,
        media_dir = %settings.media_dir.display(),
        variant = ?toolchain.variant,
        archiver = ?toolchain.archiver,
        "Axum bootstrap resolved paths"
    );

    let tracker = Arc::new(StatusTracker::new());
    let orchestrator = Arc::new(Orchestrator::new(
        settings,
        toolchain,
        runner,
        Arc::clone(&tracker),
    ));
    Ok(AxumContext {
        orchestrator,
        tracker,
    })
}

/// Bootstrap and serve until the listener fails.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config).await?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("bottler gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
