//! Candidate selection by an external agent.

use axum::Json;
use axum::extract::State;
use bottler_runtime::FinalizeRequest;

use crate::dto::{AckResponse, ChooseExeRequest};
use crate::error::HttpError;
use crate::state::AppState;

/// Start the finalize workflow for the chosen executable.
pub async fn choose_exe(
    State(state): State<AppState>,
    Json(req): Json<ChooseExeRequest>,
) -> Result<Json<AckResponse>, HttpError> {
    let environment = req
        .environment
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| HttpError::BadRequest("environment required".to_string()))?;
    let exe_path = req
        .exe_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| HttpError::BadRequest("exe_path required".to_string()))?;

    state.orchestrator.start_finalize(FinalizeRequest {
        environment: environment.clone(),
        exe_path: exe_path.clone(),
        create_shortcut: req.create_shortcut,
        create_environment: req.create_environment,
    })?;
    Ok(Json(AckResponse::accepted(format!(
        "Finalizing '{exe_path}' in '{environment}'"
    ))))
}
