//! Dependency scan results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::components::map_dll;

/// How dependencies were discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Import table read from the binary without executing it.
    Static,
    /// Module loads traced while executing the binary.
    Dynamic,
}

/// Classification of a traced module-load line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DllLoadClass {
    Loaded,
    Failed,
}

/// Outcome of one dependency scan. Produced fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub success: bool,
    pub mode: ScanMode,
    /// Mapped component identifiers, sorted and deduplicated.
    pub dependencies: BTreeSet<String>,
    /// Raw DLL names that explicitly failed to load (dynamic scans only).
    pub missing_dlls: BTreeSet<String>,
    /// Raw DLL names seen by the scan, before mapping.
    pub dlls: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyReport {
    /// Build a successful report from raw DLL names.
    ///
    /// Every name is looked up in the component table; unmapped names are
    /// dropped from `dependencies` but kept in `dlls`.
    pub fn from_dlls<I, S>(mode: ScanMode, dlls: I, missing: BTreeSet<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dlls: BTreeSet<String> = dlls.into_iter().map(Into::into).collect();
        let dependencies = dlls
            .iter()
            .chain(missing.iter())
            .filter_map(|dll| map_dll(dll))
            .map(str::to_string)
            .collect();
        Self {
            success: true,
            mode,
            dependencies,
            missing_dlls: missing,
            dlls,
            error: None,
        }
    }

    /// Build a failed report carrying an error message.
    pub fn failed(mode: ScanMode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            mode,
            dependencies: BTreeSet::new(),
            missing_dlls: BTreeSet::new(),
            dlls: BTreeSet::new(),
            error: Some(error.into()),
        }
    }

    /// True when the scan succeeded but mapped nothing.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dlls_maps_and_dedups() {
        let report = DependencyReport::from_dlls(
            ScanMode::Static,
            ["d3d11.dll", "DXGI.dll", "vcruntime140.dll", "kernel32.dll"],
            BTreeSet::new(),
        );
        let deps: Vec<&str> = report.dependencies.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["dxvk", "vcrun2019"]);
        assert!(report.missing_dlls.is_empty());
        assert!(report.dlls.contains("kernel32.dll"));
    }

    #[test]
    fn test_missing_dlls_also_map() {
        let missing: BTreeSet<String> = ["msvcp140.dll".to_string()].into();
        let report =
            DependencyReport::from_dlls(ScanMode::Dynamic, Vec::<String>::new(), missing);
        assert!(report.dependencies.contains("vcrun2019"));
        assert!(report.missing_dlls.contains("msvcp140.dll"));
    }

    #[test]
    fn test_failed_report_serializes_error() {
        let report = DependencyReport::failed(ScanMode::Static, "winedump exited with 1");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["mode"], "static");
        assert_eq!(json["error"], "winedump exited with 1");
    }
}
