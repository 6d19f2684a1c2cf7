//! Polling reads: status snapshots and candidate lists.

use axum::Json;
use axum::extract::{Path, Query, State};

use crate::dto::{CandidatesQuery, CandidatesResponse, StatusResponse};
use crate::error::HttpError;
use crate::state::AppState;

/// Snapshot of an environment; unknown names read as idle.
pub async fn get(State(state): State<AppState>, Path(name): Path<String>) -> Json<StatusResponse> {
    Json(StatusResponse {
        snapshot: state.tracker.snapshot(&name),
        busy: state.orchestrator.is_busy(&name),
    })
}

/// Cached candidates, or a scoped scan when none are cached.
pub async fn candidates(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<CandidatesResponse>, HttpError> {
    let candidates = state.orchestrator.candidates(&name, query.top_n).await?;
    Ok(Json(CandidatesResponse { name, candidates }))
}
