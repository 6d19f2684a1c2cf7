//! Domain types for bottler.
//!
//! These types represent the core business entities and are independent
//! of any infrastructure concerns (subprocesses, HTTP, filesystem layout).

mod candidate;
mod components;
mod dependency;
mod status;
mod toolchain;

pub use candidate::{CandidateSummary, ExeCandidate};
pub use components::{COMPONENT_TABLE, InstallRoute, component_values, install_route, map_dll};
pub use dependency::{DependencyReport, DllLoadClass, ScanMode};
pub use status::{EnvStatus, StatusRecord, StatusSnapshot};
pub use toolchain::{BOTTLES_FLATPAK_ID, InstallVariant, Toolchain};
