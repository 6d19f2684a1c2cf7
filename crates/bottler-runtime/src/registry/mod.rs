//! Environment Registry.
//!
//! Resolves environment names to prefixes and owns the detected toolchain.

mod detect;
mod environment;

pub use detect::{
    ARCHIVER_CANDIDATES, DetectError, NATIVE_REQUIRED_TOOLS, detect_toolchain,
    detect_toolchain_with, detect_or_native,
};
pub use environment::{EnvironmentRegistry, validate_environment_name};
