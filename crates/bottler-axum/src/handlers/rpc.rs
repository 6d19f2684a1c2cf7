//! JSON-RPC endpoint.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::Value;

use crate::rpc::{PARSE_ERROR, RpcError, RpcRequest, RpcResponse, dispatch};
use crate::state::AppState;

/// Parse the body by hand so malformed JSON still gets a JSON-RPC answer.
pub async fn handle(State(state): State<AppState>, body: Bytes) -> Json<RpcResponse> {
    match serde_json::from_slice::<RpcRequest>(&body) {
        Ok(request) => Json(dispatch(&state, request).await),
        Err(e) => Json(RpcResponse::error(
            Value::Null,
            RpcError::new(PARSE_ERROR, format!("Parse error: {e}")),
        )),
    }
}
