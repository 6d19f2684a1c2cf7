//! Prefix base directory resolution.
//!
//! Every environment lives at `<base>/<name>` and owns a `drive_c` tree.

use std::env;
use std::path::{Component, Path, PathBuf};

use super::error::PathError;
use crate::domain::InstallVariant;

/// Name of the emulated system drive inside a prefix.
pub const DRIVE_C: &str = "drive_c";

/// Environment variable overriding the prefix base.
pub const PREFIX_BASE_ENV: &str = "BOTTLER_PREFIX_BASE";

/// Bottles data directory of the Flatpak install, relative to home.
pub const FLATPAK_PREFIX_BASE_RELATIVE: &str = ".var/app/com.usebottles.bottles/data/bottles/bottles";

/// Bottles data directory of a native install, relative to home.
pub const NATIVE_PREFIX_BASE_RELATIVE: &str = ".local/share/bottles/bottles";

/// How the prefix base was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixBaseSource {
    /// Passed by the caller (CLI flag).
    Explicit,
    /// Came from `BOTTLER_PREFIX_BASE` / `.env`.
    EnvVar,
    /// Bottles default for the detected install.
    Default,
}

/// Resolution result for the prefix base.
#[derive(Debug, Clone)]
pub struct PrefixBaseResolution {
    pub path: PathBuf,
    pub source: PrefixBaseSource,
}

/// Expand a leading `~` and reject empty input.
pub fn normalize_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }
    if trimmed == "~" {
        return dirs::home_dir().ok_or(PathError::NoHomeDir);
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(trimmed))
}

/// Bottles default base directory for an install variant.
pub fn default_prefix_base(variant: InstallVariant) -> Result<PathBuf, PathError> {
    let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
    Ok(match variant {
        InstallVariant::Flatpak => home.join(FLATPAK_PREFIX_BASE_RELATIVE),
        InstallVariant::Native => home.join(NATIVE_PREFIX_BASE_RELATIVE),
    })
}

/// Resolve the prefix base.
///
/// Resolution order:
/// 1. Explicit path provided by caller
/// 2. `BOTTLER_PREFIX_BASE` environment variable
/// 3. Bottles default for `variant`
pub fn resolve_prefix_base(
    explicit: Option<&str>,
    variant: InstallVariant,
) -> Result<PrefixBaseResolution, PathError> {
    if let Some(path_str) = explicit {
        return Ok(PrefixBaseResolution {
            path: normalize_user_path(path_str)?,
            source: PrefixBaseSource::Explicit,
        });
    }

    if let Ok(env_path) = env::var(PREFIX_BASE_ENV)
        && !env_path.trim().is_empty()
    {
        return Ok(PrefixBaseResolution {
            path: normalize_user_path(&env_path)?,
            source: PrefixBaseSource::EnvVar,
        });
    }

    Ok(PrefixBaseResolution {
        path: default_prefix_base(variant)?,
        source: PrefixBaseSource::Default,
    })
}

/// `<base>/<name>`.
pub fn prefix_path(base: &Path, name: &str) -> PathBuf {
    base.join(name)
}

/// `<prefix>/drive_c`.
pub fn drive_c_path(prefix: &Path) -> PathBuf {
    prefix.join(DRIVE_C)
}

/// Lexically strip `.` and `..` so containment checks cannot be fooled.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `path` relative to `prefix`, or `OutsideRoot`.
pub fn relative_to_prefix(path: &Path, prefix: &Path) -> Result<PathBuf, PathError> {
    let clean = lexical_clean(path);
    let root = lexical_clean(prefix);
    clean
        .strip_prefix(&root)
        .map(Path::to_path_buf)
        .map_err(|_| PathError::OutsideRoot {
            path: path.to_path_buf(),
            root: prefix.to_path_buf(),
        })
}
