//! Per-environment progress records.

use serde::{Deserialize, Serialize};

use super::candidate::{CandidateSummary, ExeCandidate};

/// Coarse state of an environment.
///
/// Only `Idle` (never touched) and `Running` (at least one log line written)
/// exist; workflows do not set a terminal value, callers read the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvStatus {
    #[default]
    Idle,
    Running,
}

impl std::fmt::Display for EnvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Mutable progress record owned by the status tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRecord {
    pub status: EnvStatus,
    /// Append-only timestamped lines.
    pub log: Vec<String>,
    /// Last enumeration result, replaced wholesale.
    pub candidates: Vec<ExeCandidate>,
    /// Set once any enumeration has been stored, even an empty one.
    pub scanned: bool,
    /// Sub-directory under `drive_c` that scopes candidate searches.
    pub subpath: Option<String>,
}

/// Read-only view of a record handed to external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub name: String,
    pub status: EnvStatus,
    pub log: Vec<String>,
    pub candidates: Vec<CandidateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
}

impl StatusSnapshot {
    pub fn from_record(name: &str, record: &StatusRecord) -> Self {
        Self {
            name: name.to_string(),
            status: record.status,
            log: record.log.clone(),
            candidates: record.candidates.iter().map(CandidateSummary::from).collect(),
            subpath: record.subpath.clone(),
        }
    }
}
