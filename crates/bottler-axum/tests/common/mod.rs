//! Shared fixtures for gateway tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bottler_axum::bootstrap::{AxumContext, ServerConfig, bootstrap_with};
use bottler_core::ports::{ProvisionResult, ToolInvocation, ToolOutput, ToolRunner};
use bottler_core::Toolchain;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

/// Fake host tools: records every command line, answers import dumps with
/// a fixed listing and can hold one kind of command until released.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    import_dump: String,
    gate: Option<(&'static str, Arc<Notify>)>,
}

impl FakeRunner {
    pub fn with_imports(dlls: &[&str]) -> Self {
        let import_dump = dlls
            .iter()
            .map(|d| format!("  DLL Name: {d}\n"))
            .collect();
        Self {
            import_dump,
            ..Self::default()
        }
    }

    /// Hold every command containing `needle` until `gate` is notified.
    pub fn gated(needle: &'static str, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some((needle, gate)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn ok(stdout: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
        timed_out: false,
    }
}

#[async_trait]
impl ToolRunner for FakeRunner {
    async fn run(&self, invocation: ToolInvocation) -> ProvisionResult<ToolOutput> {
        let line = invocation.display();
        self.calls.lock().unwrap().push(line.clone());
        if let Some((needle, gate)) = &self.gate {
            if line.contains(needle) {
                gate.notified().await;
            }
        }
        if line.contains("-j import") {
            return Ok(ok(&self.import_dump));
        }
        Ok(ok(""))
    }
}

pub fn context(base: &Path, runner: Arc<FakeRunner>) -> AxumContext {
    let config = ServerConfig::with_defaults().with_prefix_base(base.to_string_lossy());
    bootstrap_with(&config, Toolchain::native(), runner).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn rpc(app: &Router, body: Value) -> Value {
    let (status, json) = post(app, "/", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    json
}
