//! Name → prefix resolution.

use std::path::{Path, PathBuf};

use bottler_core::paths::{drive_c_path, prefix_path};
use bottler_core::{InstallVariant, ProvisionError, ProvisionResult, Toolchain};

/// Resolves environment names to filesystem roots and tool commands.
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    toolchain: Toolchain,
    prefix_base: PathBuf,
}

/// Reject names that would escape the prefix base.
pub fn validate_environment_name(name: &str) -> ProvisionResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProvisionError::InvalidRequest(
            "environment name is empty".to_string(),
        ));
    }
    if trimmed != name || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ProvisionError::InvalidRequest(format!(
            "invalid environment name: {name:?}"
        )));
    }
    Ok(())
}

impl EnvironmentRegistry {
    pub fn new(toolchain: Toolchain, prefix_base: impl Into<PathBuf>) -> Self {
        Self {
            toolchain,
            prefix_base: prefix_base.into(),
        }
    }

    pub const fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub const fn variant(&self) -> InstallVariant {
        self.toolchain.variant
    }

    pub fn prefix_base(&self) -> &Path {
        &self.prefix_base
    }

    /// `<base>/<name>`.
    pub fn prefix(&self, name: &str) -> PathBuf {
        prefix_path(&self.prefix_base, name)
    }

    /// `<base>/<name>/drive_c`.
    pub fn drive_c(&self, name: &str) -> PathBuf {
        drive_c_path(&self.prefix(name))
    }

    /// True when the prefix directory exists.
    pub fn exists(&self, name: &str) -> bool {
        self.prefix(name).is_dir()
    }

    /// Archiver command prefix or `ToolUnavailable`.
    pub fn archiver(&self) -> ProvisionResult<&[String]> {
        self.toolchain
            .archiver
            .as_deref()
            .ok_or_else(|| ProvisionError::ToolUnavailable("7z".to_string()))
    }

    /// `WINEPREFIX` pair for tools running against an environment.
    pub fn wine_env(&self, name: &str) -> (String, String) {
        (
            "WINEPREFIX".to_string(),
            self.prefix(name).to_string_lossy().into_owned(),
        )
    }

    /// Library descriptor file the Flatpak Bottles GUI reads.
    pub fn library_descriptor(&self, name: &str) -> Option<PathBuf> {
        match self.variant() {
            InstallVariant::Flatpak => {
                let base = bottler_core::default_prefix_base(InstallVariant::Flatpak).ok()?;
                Some(base.join(format!("{name}.json")))
            }
            InstallVariant::Native => None,
        }
    }
}
