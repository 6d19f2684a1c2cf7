//! Core domain for bottler.
//!
//! Pure types and policy for preparing Wine environments ("bottles"):
//! the DLL → component table, candidate scoring math, the status tracker,
//! prefix path resolution and the ports implemented by the runtime crate.
//! Nothing in here spawns a process.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod scoring;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    COMPONENT_TABLE, CandidateSummary, DependencyReport, DllLoadClass, EnvStatus, ExeCandidate,
    InstallRoute, InstallVariant, ScanMode, StatusRecord, StatusSnapshot, Toolchain,
    component_values, install_route, map_dll,
};
pub use paths::{
    DRIVE_C, PathError, PrefixBaseResolution, PrefixBaseSource, default_prefix_base,
    drive_c_path, prefix_path, relative_to_prefix, resolve_prefix_base,
};
pub use ports::{ProvisionError, ProvisionResult, ToolInvocation, ToolOutput, ToolRunner};
pub use scoring::{CandidateFacts, ScoreBreakdown, folder_hint, score_candidate, similarity};
pub use services::StatusTracker;
pub use settings::{ANALYSIS_ENVIRONMENT, DEFAULT_TOP_N, ProvisionSettings, ToolTimeouts};

// Silence unused dev-dependency warnings in unit-test builds
#[cfg(test)]
use serde_json as _;
