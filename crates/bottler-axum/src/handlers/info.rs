//! Service identity and liveness.

use axum::Json;

use crate::dto::RootInfo;
use crate::rpc::SERVER_NAME;

pub async fn root() -> Json<RootInfo> {
    Json(RootInfo {
        name: SERVER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ready".to_string(),
    })
}

pub async fn health() -> &'static str {
    "OK"
}
