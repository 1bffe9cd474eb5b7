//! Tool names, risk classes and JSON Schema validation of arguments.

use devpilot_llm::ToolSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ExecuteCommand,
    ReadFile,
    WriteFile,
    EditFile,
    DeleteFile,
    CreateDirectory,
    ListDirectory,
    SearchWeb,
    GitStatus,
    GitCommit,
    GetCurrentFile,
}

impl ToolName {
    pub const ALL: [ToolName; 11] = [
        ToolName::ExecuteCommand,
        ToolName::ReadFile,
        ToolName::WriteFile,
        ToolName::EditFile,
        ToolName::DeleteFile,
        ToolName::CreateDirectory,
        ToolName::ListDirectory,
        ToolName::SearchWeb,
        ToolName::GitStatus,
        ToolName::GitCommit,
        ToolName::GetCurrentFile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::ExecuteCommand => "execute_command",
            ToolName::ReadFile => "read_file",
            ToolName::WriteFile => "write_file",
            ToolName::EditFile => "edit_file",
            ToolName::DeleteFile => "delete_file",
            ToolName::CreateDirectory => "create_directory",
            ToolName::ListDirectory => "list_directory",
            ToolName::SearchWeb => "search_web",
            ToolName::GitStatus => "git_status",
            ToolName::GitCommit => "git_commit",
            ToolName::GetCurrentFile => "get_current_file",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk classification for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Tool has no side effects worth gating.
    Safe,
    /// Tool is destructive or externally visible and needs confirmation.
    Sensitive,
}

/// Static catalogue entry for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: ToolName,
    pub description: &'static str,
    /// JSON Schema for validating input arguments.
    pub input_schema: Value,
    pub risk_level: RiskLevel,
}

impl ToolSpec {
    pub fn is_sensitive(&self) -> bool {
        self.risk_level == RiskLevel::Sensitive
    }

    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.as_str().to_string(),
            description: self.description.to_string(),
            parameters: self.input_schema.clone(),
        }
    }
}

/// Validate a JSON value against a minimal JSON Schema subset.
///
/// Supports: `type`, `required`, `properties` (recursive), `items`.
/// An empty schema `{}` passes anything.
pub fn validate_schema(value: &Value, schema: &Value) -> Result<(), ToolError> {
    let schema_obj = match schema.as_object() {
        Some(obj) if !obj.is_empty() => obj,
        _ => return Ok(()),
    };

    if let Some(type_val) = schema_obj.get("type") {
        let type_str = type_val
            .as_str()
            .ok_or_else(|| ToolError::invalid("schema 'type' must be a string"))?;

        let matches = match type_str {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            "null" => value.is_null(),
            other => return Err(ToolError::invalid(format!("unknown schema type: {other}"))),
        };

        if !matches {
            return Err(ToolError::invalid(format!(
                "expected type '{type_str}', got {}",
                json_type_name(value)
            )));
        }
    }

    if let (Some(required), Some(obj)) = (
        schema_obj.get("required").and_then(Value::as_array),
        value.as_object(),
    ) {
        for key in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(key) {
                return Err(ToolError::invalid(format!(
                    "missing required parameter: '{key}'"
                )));
            }
        }
    }

    if let (Some(props), Some(obj)) = (
        schema_obj.get("properties").and_then(Value::as_object),
        value.as_object(),
    ) {
        for (key, prop_schema) in props {
            if let Some(prop_value) = obj.get(key) {
                validate_schema(prop_value, prop_schema)
                    .map_err(|e| ToolError::invalid(format!("'{key}': {}", strip_prefix(&e))))?;
            }
        }
    }

    if let (Some(items), Some(arr)) = (schema_obj.get("items"), value.as_array()) {
        for item in arr {
            validate_schema(item, items)?;
        }
    }

    Ok(())
}

fn strip_prefix(error: &ToolError) -> String {
    match error {
        ToolError::InvalidInvocation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Returns a human-readable name for the JSON type of a value.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_names_round_trip_through_parse() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
            assert_eq!(serde_json::to_value(tool).unwrap(), json!(tool.as_str()));
        }
        assert_eq!(ToolName::parse("rm_rf"), None);
    }

    #[test]
    fn validate_type_mismatch() {
        let schema = json!({"type": "string"});
        assert!(validate_schema(&json!("hello"), &schema).is_ok());
        assert!(validate_schema(&json!(42), &schema).is_err());
    }

    #[test]
    fn validate_integer_rejects_float() {
        let schema = json!({"type": "integer"});
        assert!(validate_schema(&json!(42), &schema).is_ok());
        assert!(validate_schema(&json!(3.5), &schema).is_err());
    }

    #[test]
    fn validate_required_reports_missing_parameter() {
        let schema = json!({
            "type": "object",
            "required": ["path", "content"]
        });
        let err = validate_schema(&json!({"path": "a.txt"}), &schema).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidInvocation("missing required parameter: 'content'".to_string())
        );
    }

    #[test]
    fn validate_properties_recursive() {
        let schema = json!({
            "type": "object",
            "properties": {
                "recursive": {"type": "boolean"},
                "files": {"type": "array", "items": {"type": "string"}}
            }
        });
        assert!(validate_schema(&json!({"recursive": true, "files": ["a"]}), &schema).is_ok());
        let err = validate_schema(&json!({"recursive": "yes"}), &schema).unwrap_err();
        assert!(err.to_string().contains("'recursive'"));
        assert!(validate_schema(&json!({"files": [1]}), &schema).is_err());
    }

    #[test]
    fn empty_schema_passes_anything() {
        let schema = json!({});
        assert!(validate_schema(&json!("string"), &schema).is_ok());
        assert!(validate_schema(&json!(null), &schema).is_ok());
        assert!(validate_schema(&json!({"key": "val"}), &schema).is_ok());
    }
}
