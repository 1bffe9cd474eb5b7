use std::collections::HashMap;

use devpilot_llm::{ToolInvocationRequest, ToolSchema};
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::call::ToolCall;
use crate::tools::schema::{validate_schema, RiskLevel, ToolName, ToolSpec};

/// The fixed catalogue of tools offered to the model.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, ToolSpec>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        let tools = builtin_specs()
            .into_iter()
            .map(|spec| (spec.name, spec))
            .collect();
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        ToolName::parse(name).and_then(|tool| self.tools.get(&tool))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Every spec, in catalogue order.
    pub fn list(&self) -> Vec<&ToolSpec> {
        ToolName::ALL
            .iter()
            .filter_map(|tool| self.tools.get(tool))
            .collect()
    }

    /// Descriptions handed to the transport on every model request.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.list().into_iter().map(ToolSpec::schema).collect()
    }

    /// Look up, validate and type a model-requested invocation.
    pub fn resolve(
        &self,
        request: &ToolInvocationRequest,
    ) -> Result<(&ToolSpec, ToolCall), ToolError> {
        let spec = self
            .get(&request.name)
            .ok_or_else(|| ToolError::invalid(format!("unknown tool: {}", request.name)))?;
        let arguments = Value::Object(request.arguments.clone());
        validate_schema(&arguments, &spec.input_schema)?;
        let call = ToolCall::parse(spec.name, &request.arguments)?;
        Ok((spec, call))
    }
}

fn spec(
    name: ToolName,
    description: &'static str,
    input_schema: Value,
    risk_level: RiskLevel,
) -> ToolSpec {
    ToolSpec {
        name,
        description,
        input_schema,
        risk_level,
    }
}

fn builtin_specs() -> Vec<ToolSpec> {
    vec![
        spec(
            ToolName::ExecuteCommand,
            "Execute a shell command in the workspace and return its output.",
            json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "The command to execute"},
                    "cwd": {"type": "string", "description": "Working directory relative to the workspace (optional)"}
                },
                "required": ["command"]
            }),
            RiskLevel::Sensitive,
        ),
        spec(
            ToolName::ReadFile,
            "Read the contents of a file.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path relative to the workspace"}
                },
                "required": ["path"]
            }),
            RiskLevel::Safe,
        ),
        spec(
            ToolName::WriteFile,
            "Write content to a file, creating or overwriting it.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path relative to the workspace"},
                    "content": {"type": "string", "description": "Content to write"}
                },
                "required": ["path", "content"]
            }),
            RiskLevel::Sensitive,
        ),
        spec(
            ToolName::EditFile,
            "Replace every occurrence of a literal search string in a file.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path relative to the workspace"},
                    "search": {"type": "string", "description": "Text to search for"},
                    "replace": {"type": "string", "description": "Text to replace it with"}
                },
                "required": ["path", "search", "replace"]
            }),
            RiskLevel::Safe,
        ),
        spec(
            ToolName::DeleteFile,
            "Delete a file, or a directory tree when recursive is set.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to delete"},
                    "recursive": {"type": "boolean", "description": "Delete directories recursively"}
                },
                "required": ["path"]
            }),
            RiskLevel::Sensitive,
        ),
        spec(
            ToolName::CreateDirectory,
            "Create a directory and any missing parents.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Directory path"}
                },
                "required": ["path"]
            }),
            RiskLevel::Safe,
        ),
        spec(
            ToolName::ListDirectory,
            "List the entries of a directory. Directories carry a trailing slash.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Directory path"}
                },
                "required": ["path"]
            }),
            RiskLevel::Safe,
        ),
        spec(
            ToolName::SearchWeb,
            "Search the web using Google Custom Search.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"},
                    "num_results": {"type": "number", "description": "Number of results (1-10)"}
                },
                "required": ["query"]
            }),
            RiskLevel::Safe,
        ),
        spec(
            ToolName::GitStatus,
            "Show the short git status of the workspace.",
            json!({"type": "object", "properties": {}}),
            RiskLevel::Safe,
        ),
        spec(
            ToolName::GitCommit,
            "Commit changes. Stages the listed files, or everything when nothing is staged.",
            json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string", "description": "Commit message"},
                    "files": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Files to stage before committing"
                    }
                },
                "required": ["message"]
            }),
            RiskLevel::Sensitive,
        ),
        spec(
            ToolName::GetCurrentFile,
            "Get the path and content of the file currently open in the editor.",
            json!({"type": "object", "properties": {}}),
            RiskLevel::Safe,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn request(name: &str, arguments: Value) -> ToolInvocationRequest {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ToolInvocationRequest::new(name, arguments)
    }

    #[test]
    fn catalogue_has_every_tool_in_order() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.len(), 11);
        let names: Vec<String> = registry.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names.first().map(String::as_str), Some("execute_command"));
        assert_eq!(names.last().map(String::as_str), Some("get_current_file"));
    }

    #[test]
    fn sensitive_tools_match_catalogue() {
        let registry = ToolRegistry::new();
        let sensitive: Vec<&str> = registry
            .list()
            .into_iter()
            .filter(|spec| spec.is_sensitive())
            .map(|spec| spec.name.as_str())
            .collect();
        assert_eq!(
            sensitive,
            vec!["execute_command", "write_file", "delete_file", "git_commit"]
        );
    }

    #[test]
    fn resolve_unknown_tool_is_invalid_invocation() {
        let registry = ToolRegistry::new();
        let err = registry
            .resolve(&request("format_disk", json!({})))
            .unwrap_err();
        assert_eq!(err, ToolError::InvalidInvocation("unknown tool: format_disk".into()));
    }

    #[test]
    fn resolve_missing_required_parameter() {
        let registry = ToolRegistry::new();
        let err = registry
            .resolve(&request("write_file", json!({"path": "a.txt"})))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInvocation(ref msg) if msg.contains("content")));
    }

    #[test]
    fn resolve_types_the_call() {
        let registry = ToolRegistry::new();
        let (spec, call) = registry
            .resolve(&request("read_file", json!({"path": "src/main.rs"})))
            .unwrap();
        assert_eq!(spec.name, ToolName::ReadFile);
        assert_eq!(call.name(), ToolName::ReadFile);
    }
}
