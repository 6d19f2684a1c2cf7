//! Tool schemas and argument extraction for `tools/call`.

use serde_json::{Map, Value, json};

pub const BOTTLES_INSTALLER: &str = "bottles_installer";
pub const BOTTLES_FOLDER_INSTALLER: &str = "bottles_folder_installer";
pub const BOTTLES_INSTALL_DEPS: &str = "bottles_install_deps";
pub const ANALYZE_DEPENDENCIES: &str = "analyze_dependencies";

fn string_props(names: &[&str]) -> Value {
    let props: Map<String, Value> = names
        .iter()
        .map(|n| ((*n).to_string(), json!({ "type": "string" })))
        .collect();
    Value::Object(props)
}

fn tool(name: &str, description: &str, required: &[&str]) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": string_props(required),
            "required": required,
        }
    })
}

/// Static descriptions returned by `tools/list`.
pub fn tool_schemas() -> Vec<Value> {
    vec![
        tool(
            BOTTLES_INSTALLER,
            "Create environment, scan deps, install, run setup or program (bg)",
            &["program_path", "bottle_name"],
        ),
        tool(
            BOTTLES_FOLDER_INSTALLER,
            "Copy a folder into an environment and rank its executables (bg)",
            &["folder_path", "bottle_name"],
        ),
        tool(
            BOTTLES_INSTALL_DEPS,
            "Scan & install deps into existing environment (bg)",
            &["program_path", "bottle_name"],
        ),
        tool(
            ANALYZE_DEPENDENCIES,
            "Scan PE file for DLL deps (dry-run)",
            &["program_path"],
        ),
    ]
}

/// Arguments of one `tools/call`.
///
/// Single-element lists are unwrapped to their first element and blank
/// strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.first().and_then(scalar),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ToolArgs {
    /// Tool name and arguments from `params`.
    ///
    /// `toolName` aliases `name`; without a non-empty `arguments` object the
    /// params themselves are the arguments.
    pub fn from_params(params: &Value) -> (Option<String>, Self) {
        let name = ["name", "toolName"]
            .iter()
            .find_map(|k| params.get(*k).and_then(scalar));
        let args = match params.get("arguments") {
            Some(Value::Object(map)) if !map.is_empty() => map.clone(),
            _ => params.as_object().cloned().unwrap_or_default(),
        };
        (name, Self(args))
    }

    /// First present key among `keys`.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.0.get(*k).and_then(scalar))
    }

    /// `program_path`, or its `exe_path` alias.
    pub fn program_path(&self) -> Option<String> {
        self.text(&["program_path", "exe_path"])
    }

    pub fn bottle_name(&self) -> Option<String> {
        self.text(&["bottle_name"])
    }

    pub fn folder_path(&self) -> Option<String> {
        self.text(&["folder_path", "program_path"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_list_four_tools() {
        let names: Vec<String> = tool_schemas()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                BOTTLES_INSTALLER,
                BOTTLES_FOLDER_INSTALLER,
                BOTTLES_INSTALL_DEPS,
                ANALYZE_DEPENDENCIES
            ]
        );
        assert_eq!(
            tool_schemas()[0]["inputSchema"]["required"],
            json!(["program_path", "bottle_name"])
        );
    }

    #[test]
    fn test_name_alias_and_argument_fallback() {
        let (name, args) = ToolArgs::from_params(&json!({
            "toolName": "analyze_dependencies",
            "program_path": ["/tmp/a.exe", "/tmp/b.exe"],
        }));
        assert_eq!(name.as_deref(), Some("analyze_dependencies"));
        assert_eq!(args.program_path().as_deref(), Some("/tmp/a.exe"));

        let (name, args) = ToolArgs::from_params(&json!({
            "name": "bottles_installer",
            "arguments": { "exe_path": "/x.exe", "bottle_name": ["game"] },
        }));
        assert_eq!(name.as_deref(), Some("bottles_installer"));
        assert_eq!(args.program_path().as_deref(), Some("/x.exe"));
        assert_eq!(args.bottle_name().as_deref(), Some("game"));
    }

    #[test]
    fn test_blank_and_empty_list_are_missing() {
        let (_, args) = ToolArgs::from_params(&json!({
            "arguments": { "program_path": "  ", "bottle_name": [] }
        }));
        assert!(args.program_path().is_none());
        assert!(args.bottle_name().is_none());
    }
}
