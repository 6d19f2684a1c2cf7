//! Axum gateway for bottler.
//!
//! Serves the JSON-RPC tool-call endpoint and the polling REST reads on top
//! of the `bottler-runtime` orchestrator.

#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings in unit-test builds
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod rpc;
pub mod state;

// Re-export primary types
pub use bootstrap::{
    AxumContext, CorsConfig, DEFAULT_HOST, DEFAULT_PORT, ServerConfig, bootstrap, bootstrap_with,
    start_server,
};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
