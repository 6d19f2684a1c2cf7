//! External command prefixes used to drive an environment.

use serde::{Deserialize, Serialize};

/// Flatpak application id of Bottles.
pub const BOTTLES_FLATPAK_ID: &str = "com.usebottles.bottles";

/// Which Bottles installation the toolchain points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallVariant {
    Flatpak,
    Native,
}

impl std::fmt::Display for InstallVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flatpak => write!(f, "flatpak"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// Command prefixes for every external tool.
///
/// Each field is the argv prefix to which tool-specific arguments are
/// appended, e.g. `["flatpak", "run", "--command=wine", "com.usebottles.bottles"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    pub variant: InstallVariant,
    /// Environment CLI (`bottles-cli`).
    pub bottles_cli: Vec<String>,
    /// Compatibility runtime (`wine`).
    pub wine: Vec<String>,
    /// Dependency installer (`winetricks`).
    pub winetricks: Vec<String>,
    /// Binary-dump tool (`winedump`).
    pub winedump: Vec<String>,
    /// Environment server control (`wineserver`).
    pub wineserver: Vec<String>,
    /// Disk-image archiver (`7z`), absent when not installed.
    pub archiver: Option<Vec<String>>,
}

impl Toolchain {
    /// Toolchain running every tool inside the Bottles Flatpak sandbox.
    pub fn flatpak() -> Self {
        let wrap = |tool: &str| {
            vec![
                "flatpak".to_string(),
                "run".to_string(),
                format!("--command={tool}"),
                BOTTLES_FLATPAK_ID.to_string(),
            ]
        };
        Self {
            variant: InstallVariant::Flatpak,
            bottles_cli: wrap("bottles-cli"),
            wine: wrap("wine"),
            winetricks: wrap("winetricks"),
            winedump: wrap("winedump"),
            wineserver: wrap("wineserver"),
            archiver: None,
        }
    }

    /// Toolchain using binaries found on the host `PATH`.
    pub fn native() -> Self {
        let bare = |tool: &str| vec![tool.to_string()];
        Self {
            variant: InstallVariant::Native,
            bottles_cli: bare("bottles-cli"),
            wine: bare("wine"),
            winetricks: bare("winetricks"),
            winedump: bare("winedump"),
            wineserver: bare("wineserver"),
            archiver: None,
        }
    }

    /// Attach an archiver command.
    #[must_use]
    pub fn with_archiver(mut self, archiver: Vec<String>) -> Self {
        self.archiver = Some(archiver);
        self
    }
}
