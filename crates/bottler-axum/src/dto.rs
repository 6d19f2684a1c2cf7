//! Request and response bodies of the REST endpoints.

use bottler_core::{ExeCandidate, StatusSnapshot};
use serde::{Deserialize, Serialize};

/// `GET /` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootInfo {
    pub name: String,
    pub version: String,
    pub status: String,
}

/// `GET /status/{name}` body: the tracker snapshot plus the supervisor's
/// view of whether a workflow is still in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub busy: bool,
}

/// `GET /candidates/{name}` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatesQuery {
    pub top_n: Option<usize>,
}

/// `GET /candidates/{name}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub name: String,
    pub candidates: Vec<ExeCandidate>,
}

fn default_true() -> bool {
    true
}

/// `POST /agent/choose_exe` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChooseExeRequest {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub exe_path: Option<String>,
    #[serde(default = "default_true")]
    pub create_shortcut: bool,
    #[serde(default)]
    pub create_environment: bool,
}

/// Acknowledgment for accepted background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
    pub message: String,
}

impl AckResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            status: "accepted".to_string(),
            message: message.into(),
        }
    }
}
