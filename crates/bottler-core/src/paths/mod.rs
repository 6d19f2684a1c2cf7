//! Path utilities for environment prefixes.
//!
//! - Prefix base directory resolution (explicit, env var, install default)
//! - Per-environment prefix and `drive_c` layout
//! - Containment checks for paths that must stay inside a prefix
//!
//! No filesystem access happens here except expanding `~`.

mod error;
mod prefix;

pub use error::PathError;
pub use prefix::{
    DRIVE_C, FLATPAK_PREFIX_BASE_RELATIVE, NATIVE_PREFIX_BASE_RELATIVE, PREFIX_BASE_ENV,
    PrefixBaseResolution, PrefixBaseSource, default_prefix_base, drive_c_path,
    normalize_user_path, prefix_path, relative_to_prefix, resolve_prefix_base,
};
