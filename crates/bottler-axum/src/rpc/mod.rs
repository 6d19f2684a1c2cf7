//! JSON-RPC dispatch.
//!
//! Every request gets a response object; failures are reported through the
//! `error` member, never as an HTTP error status.

pub mod tools;

use bottler_core::ProvisionError;
use bottler_runtime::FinalizeRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::state::AppState;
use tools::{
    ANALYZE_DEPENDENCIES, BOTTLES_FOLDER_INSTALLER, BOTTLES_INSTALL_DEPS, BOTTLES_INSTALLER,
    ToolArgs, tool_schemas,
};

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const OPERATION_FAILED: i64 = -32000;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "BottleAutomator";

/// Incoming request. Every member is optional so malformed requests still
/// produce a structured answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ProvisionError> for RpcError {
    fn from(err: ProvisionError) -> Self {
        let code = match err {
            ProvisionError::InvalidRequest(_) => INVALID_PARAMS,
            _ => OPERATION_FAILED,
        };
        Self::new(code, err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Text payload of a tool result.
fn text_content(text: impl Into<String>) -> Value {
    json!({ "content": text.into(), "contentType": "text/plain" })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
        "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
    })
}

/// Answer one request.
pub async fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_deref().unwrap_or_default();
    debug!(method, id = %id, "JSON-RPC request");

    match method {
        "initialize" => RpcResponse::result(id, initialize_result()),
        "tools/list" => RpcResponse::result(id, json!({ "tools": tool_schemas() })),
        "tools/call" | "call" => match call_tool(state, &request.params).await {
            Ok(result) => RpcResponse::result(id, result),
            Err(error) => {
                warn!(code = error.code, message = %error.message, "Tool call rejected");
                RpcResponse::error(id, error)
            }
        },
        other => RpcResponse::error(
            id,
            RpcError::new(METHOD_NOT_FOUND, format!("Method not supported: {other}")),
        ),
    }
}

fn require_program_and_bottle(args: &ToolArgs) -> Result<(String, String), RpcError> {
    match (args.program_path(), args.bottle_name()) {
        (Some(program), Some(bottle)) => Ok((program, bottle)),
        _ => Err(RpcError::new(
            INVALID_PARAMS,
            "program_path and bottle_name required",
        )),
    }
}

async fn call_tool(state: &AppState, params: &Value) -> Result<Value, RpcError> {
    let (name, args) = ToolArgs::from_params(params);
    let name = name.unwrap_or_default();
    let orchestrator = &state.orchestrator;

    match name.as_str() {
        BOTTLES_INSTALLER => {
            let (program, bottle) = require_program_and_bottle(&args)?;
            orchestrator.start_full_install(&bottle, &program)?;
            Ok(text_content(format!(
                "Bottle '{bottle}' setup running in background"
            )))
        }
        BOTTLES_FOLDER_INSTALLER => {
            let (Some(folder), Some(bottle)) = (args.folder_path(), args.bottle_name()) else {
                return Err(RpcError::new(
                    INVALID_PARAMS,
                    "folder_path and bottle_name required",
                ));
            };
            orchestrator.start_folder_import(&bottle, &folder)?;
            Ok(text_content(format!(
                "Copying '{folder}' into bottle '{bottle}' in background"
            )))
        }
        BOTTLES_INSTALL_DEPS => {
            let (program, bottle) = require_program_and_bottle(&args)?;
            orchestrator.start_finalize(FinalizeRequest {
                environment: bottle,
                exe_path: program.clone(),
                create_shortcut: false,
                create_environment: false,
            })?;
            Ok(text_content(format!("Scan started for '{program}'")))
        }
        ANALYZE_DEPENDENCIES => {
            let program = args
                .program_path()
                .ok_or_else(|| RpcError::new(INVALID_PARAMS, "program_path required"))?;
            let report = orchestrator.analyze(&program).await;
            if !report.success {
                return Err(RpcError::new(
                    OPERATION_FAILED,
                    report.error.unwrap_or_else(|| "unknown error".to_string()),
                ));
            }
            let deps: Vec<&str> = report.dependencies.iter().map(String::as_str).collect();
            Ok(text_content(format!(
                "Found {} dependencies:\n{}",
                deps.len(),
                deps.join("\n")
            )))
        }
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Tool not found: {other}"),
        )),
    }
}
