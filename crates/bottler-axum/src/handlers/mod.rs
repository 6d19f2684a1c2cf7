//! HTTP request handlers for the gateway.
//!
//! Handlers are thin wrappers that delegate to the `Orchestrator`.

pub mod agent;
pub mod info;
pub mod rpc;
pub mod status;
