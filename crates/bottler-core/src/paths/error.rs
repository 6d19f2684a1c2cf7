//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during prefix path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the user's home directory.
    #[error("Cannot determine home directory")]
    NoHomeDir,

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,

    /// A path that must stay inside an environment escapes it.
    #[error("{path} is outside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}
