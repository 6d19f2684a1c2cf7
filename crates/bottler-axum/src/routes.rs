//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Gateway routes without state applied.
pub(crate) fn gateway_routes() -> Router<AppState> {
    Router::new()
        // JSON-RPC endpoint and service identity share the root path
        .route("/", get(handlers::info::root).post(handlers::rpc::handle))
        .route("/health", get(handlers::info::health))
        // Polling reads
        .route("/status/{name}", get(handlers::status::get))
        .route("/candidates/{name}", get(handlers::status::candidates))
        // Agent selection
        .route("/agent/choose_exe", post(handlers::agent::choose_exe))
}

/// Create the gateway router.
pub fn create_router(ctx: AxumContext, cors: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    gateway_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors))
}
