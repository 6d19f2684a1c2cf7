//! Host-side adapters for bottler.
//!
//! Implements the ports from `bottler-core` against real processes and the
//! filesystem: tool execution, toolchain detection, dependency scans,
//! candidate enumeration, disk-image extraction and the workflows that tie
//! them together.

#![deny(unused_crate_dependencies)]

pub mod candidates;
mod command;
pub mod deps;
pub mod media;
pub mod ops;
pub mod orchestrator;
pub mod registry;

#[cfg(test)]
mod testing;

// Re-export the process-backed ToolRunner
pub use command::SystemToolRunner;

// Re-export the orchestration surface used by adapters
pub use orchestrator::{FinalizeRequest, Orchestrator, WorkflowSupervisor};

// Re-export registry helpers needed at startup
pub use registry::{DetectError, EnvironmentRegistry, detect_or_native, detect_toolchain};

// Silence unused dev-dependency warnings in unit-test builds
#[cfg(test)]
use tokio_test as _;
