//! Toolchain detection.
//!
//! Prefers the Bottles Flatpak, then a native install whose tools are all on
//! `PATH`. The disk-image archiver is looked up on the host either way.

use std::path::PathBuf;
use std::time::Duration;

use bottler_core::domain::BOTTLES_FLATPAK_ID;
use bottler_core::ports::{ToolInvocation, ToolRunner};
use bottler_core::Toolchain;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Tools that must all be on `PATH` for a native install.
pub const NATIVE_REQUIRED_TOOLS: &[&str] = &["bottles-cli", "wine", "winetricks", "wineserver"];

/// Archiver executables in order of preference.
pub const ARCHIVER_CANDIDATES: &[&str] = &["7z", "7zz"];

const FLATPAK_LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from toolchain detection.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Neither the Flatpak nor a complete native install was found.
    #[error("No Bottles installation found (missing on PATH: {})", missing.join(", "))]
    NoInstallation { missing: Vec<String> },
}

/// True when `flatpak list` reports the Bottles application.
async fn flatpak_has_bottles(runner: &dyn ToolRunner) -> bool {
    let prefix = vec!["flatpak".to_string()];
    let invocation = ToolInvocation::new(
        &prefix,
        ["list", "--app", "--columns=application"],
        FLATPAK_LIST_TIMEOUT,
    );
    match runner.run(invocation).await {
        Ok(out) if out.success() => out.stdout.lines().any(|l| l.trim() == BOTTLES_FLATPAK_ID),
        Ok(_) => false,
        Err(e) => {
            debug!(error = %e, "flatpak not usable");
            false
        }
    }
}

/// Detect the toolchain using `lookup` to resolve host executables.
pub async fn detect_toolchain_with<L>(
    runner: &dyn ToolRunner,
    lookup: L,
) -> Result<Toolchain, DetectError>
where
    L: Fn(&str) -> Option<PathBuf>,
{
    let toolchain = if flatpak_has_bottles(runner).await {
        Toolchain::flatpak()
    } else {
        let missing: Vec<String> = NATIVE_REQUIRED_TOOLS
            .iter()
            .filter(|tool| lookup(tool).is_none())
            .map(|tool| (*tool).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DetectError::NoInstallation { missing });
        }
        Toolchain::native()
    };

    let archiver = ARCHIVER_CANDIDATES
        .iter()
        .find_map(|name| lookup(name).map(|_| vec![(*name).to_string()]));
    let toolchain = match archiver {
        Some(argv) => toolchain.with_archiver(argv),
        None => toolchain,
    };

    info!(
        variant = %toolchain.variant,
        archiver = toolchain.archiver.is_some(),
        "Detected Bottles toolchain"
    );
    Ok(toolchain)
}

/// Detect the toolchain on the host `PATH`.
pub async fn detect_toolchain(runner: &dyn ToolRunner) -> Result<Toolchain, DetectError> {
    detect_toolchain_with(runner, |name| which::which(name).ok()).await
}

/// Detect the toolchain, falling back to native command names.
///
/// Used by the server so status reads keep working on hosts without Bottles.
pub async fn detect_or_native(runner: &dyn ToolRunner) -> Toolchain {
    match detect_toolchain(runner).await {
        Ok(toolchain) => toolchain,
        Err(e) => {
            warn!(error = %e, "Toolchain detection failed, assuming native command names");
            let archiver = ARCHIVER_CANDIDATES
                .iter()
                .find(|name| which::which(name).is_ok())
                .map(|name| vec![(*name).to_string()]);
            match archiver {
                Some(argv) => Toolchain::native().with_archiver(argv),
                None => Toolchain::native(),
            }
        }
    }
}
