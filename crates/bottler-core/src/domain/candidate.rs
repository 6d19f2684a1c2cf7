//! Executable candidates produced by enumeration and scoring.

use serde::{Deserialize, Serialize};

/// A discovered executable considered as the environment's main program.
///
/// Candidate lists are transient: every enumeration replaces the previous
/// list wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExeCandidate {
    /// Absolute host path of the executable.
    pub path: String,
    /// Product name from version resources or the string-table fallback.
    pub product_name: String,
    /// File version from version resources, empty when unknown.
    pub file_version: String,
    /// File size in bytes.
    pub size: u64,
    /// Modification time as fractional seconds since the Unix epoch.
    pub mtime: f64,
    /// Heuristic score; higher is more likely the main program.
    pub score: u32,
    /// Similarity between the folder hint and the file name, rounded to 3 places.
    pub sim_name: f64,
    /// Similarity between the folder hint and the product name, rounded to 3 places.
    pub sim_prod: f64,
}

impl ExeCandidate {
    /// File name component of the candidate path.
    pub fn file_name(&self) -> Option<&str> {
        std::path::Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
    }
}

/// Size-trimmed view of a candidate for status polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub path: String,
    pub score: u32,
    pub product_name: String,
    pub size: u64,
    pub mtime: f64,
}

impl From<&ExeCandidate> for CandidateSummary {
    fn from(candidate: &ExeCandidate) -> Self {
        Self {
            path: candidate.path.clone(),
            score: candidate.score,
            product_name: candidate.product_name.clone(),
            size: candidate.size,
            mtime: candidate.mtime,
        }
    }
}
