//! Provisioning settings.
//!
//! Pure configuration types. Reading the process environment happens in
//! [`ProvisionSettings::from_env`]; adapters layer CLI flags on top.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of candidates kept after ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Scratch environment used for dry-run dependency analysis.
pub const ANALYSIS_ENVIRONMENT: &str = "temp_analysis";

/// Environment variable for the dynamic trace timeout in seconds.
pub const TRACE_TIMEOUT_ENV: &str = "BOTTLER_TRACE_TIMEOUT_SECS";

/// Environment variable for the ephemeral media scratch directory.
pub const MEDIA_DIR_ENV: &str = "BOTTLER_MEDIA_DIR";

/// Time bounds for every external tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolTimeouts {
    pub create: Duration,
    /// `wineboot --repair` after creation.
    pub repair: Duration,
    pub install: Duration,
    pub static_dump: Duration,
    pub metadata_dump: Duration,
    pub trace: Duration,
    pub run: Duration,
    pub shortcut: Duration,
    pub archiver: Duration,
    /// Bound of a single `wineserver --wait` attempt.
    pub idle_wait: Duration,
    pub idle_attempts: u32,
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(300),
            repair: Duration::from_secs(60),
            install: Duration::from_secs(600),
            static_dump: Duration::from_secs(30),
            metadata_dump: Duration::from_secs(15),
            trace: Duration::from_secs(15),
            run: Duration::from_secs(600),
            shortcut: Duration::from_secs(30),
            archiver: Duration::from_secs(600),
            idle_wait: Duration::from_secs(10),
            idle_attempts: 30,
        }
    }
}

/// Settings shared by the orchestrator and its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Directory holding every environment prefix.
    pub prefix_base: PathBuf,
    /// Parent of ephemeral media extraction directories.
    pub media_dir: PathBuf,
    pub timeouts: ToolTimeouts,
    pub top_n: usize,
    pub analysis_environment: String,
}

impl ProvisionSettings {
    /// Settings with defaults for everything except the prefix base.
    pub fn new(prefix_base: impl Into<PathBuf>) -> Self {
        Self {
            prefix_base: prefix_base.into(),
            media_dir: env::temp_dir(),
            timeouts: ToolTimeouts::default(),
            top_n: DEFAULT_TOP_N,
            analysis_environment: ANALYSIS_ENVIRONMENT.to_string(),
        }
    }

    /// Apply `BOTTLER_MEDIA_DIR` and `BOTTLER_TRACE_TIMEOUT_SECS` overrides.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if let Ok(dir) = env::var(MEDIA_DIR_ENV)
            && !dir.trim().is_empty()
        {
            self.media_dir = PathBuf::from(dir.trim());
        }
        if let Some(secs) = env::var(TRACE_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            self.timeouts.trace = Duration::from_secs(secs);
        }
        self
    }

    #[must_use]
    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: ToolTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}
