//! Typed form of a model-requested invocation.
//!
//! Arguments arrive as an untyped JSON object. Once the registry has checked
//! them against the tool's schema they are decoded into one of the variants
//! below, so collaborators never see a raw map.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::tools::schema::ToolName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteCommandArgs {
    pub command: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFileArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditFileArgs {
    pub path: String,
    pub search: String,
    pub replace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFileArgs {
    pub path: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchWebArgs {
    pub query: String,
    /// Models send JSON numbers, sometimes as floats.
    #[serde(default)]
    pub num_results: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitCommitArgs {
    pub message: String,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ExecuteCommand(ExecuteCommandArgs),
    ReadFile(PathArgs),
    WriteFile(WriteFileArgs),
    EditFile(EditFileArgs),
    DeleteFile(DeleteFileArgs),
    CreateDirectory(PathArgs),
    ListDirectory(PathArgs),
    SearchWeb(SearchWebArgs),
    GitStatus,
    GitCommit(GitCommitArgs),
    GetCurrentFile,
}

impl ToolCall {
    pub fn parse(name: ToolName, arguments: &Map<String, Value>) -> Result<Self, ToolError> {
        let call = match name {
            ToolName::ExecuteCommand => ToolCall::ExecuteCommand(decode(name, arguments)?),
            ToolName::ReadFile => ToolCall::ReadFile(decode(name, arguments)?),
            ToolName::WriteFile => ToolCall::WriteFile(decode(name, arguments)?),
            ToolName::EditFile => ToolCall::EditFile(decode(name, arguments)?),
            ToolName::DeleteFile => ToolCall::DeleteFile(decode(name, arguments)?),
            ToolName::CreateDirectory => ToolCall::CreateDirectory(decode(name, arguments)?),
            ToolName::ListDirectory => ToolCall::ListDirectory(decode(name, arguments)?),
            ToolName::SearchWeb => ToolCall::SearchWeb(decode(name, arguments)?),
            ToolName::GitStatus => ToolCall::GitStatus,
            ToolName::GitCommit => ToolCall::GitCommit(decode(name, arguments)?),
            ToolName::GetCurrentFile => ToolCall::GetCurrentFile,
        };
        Ok(call)
    }

    pub fn name(&self) -> ToolName {
        match self {
            ToolCall::ExecuteCommand(_) => ToolName::ExecuteCommand,
            ToolCall::ReadFile(_) => ToolName::ReadFile,
            ToolCall::WriteFile(_) => ToolName::WriteFile,
            ToolCall::EditFile(_) => ToolName::EditFile,
            ToolCall::DeleteFile(_) => ToolName::DeleteFile,
            ToolCall::CreateDirectory(_) => ToolName::CreateDirectory,
            ToolCall::ListDirectory(_) => ToolName::ListDirectory,
            ToolCall::SearchWeb(_) => ToolName::SearchWeb,
            ToolCall::GitStatus => ToolName::GitStatus,
            ToolCall::GitCommit(_) => ToolName::GitCommit,
            ToolCall::GetCurrentFile => ToolName::GetCurrentFile,
        }
    }
}

fn decode<T: DeserializeOwned>(name: ToolName, arguments: &Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(arguments.clone()))
        .map_err(|e| ToolError::invalid(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn optional_arguments_take_defaults() {
        let call = ToolCall::parse(ToolName::DeleteFile, &args(json!({"path": "build"}))).unwrap();
        assert_eq!(
            call,
            ToolCall::DeleteFile(DeleteFileArgs {
                path: "build".into(),
                recursive: false
            })
        );

        let call = ToolCall::parse(ToolName::GitCommit, &args(json!({"message": "wip"}))).unwrap();
        assert_eq!(
            call,
            ToolCall::GitCommit(GitCommitArgs {
                message: "wip".into(),
                files: Vec::new()
            })
        );
    }

    #[test]
    fn unit_tools_ignore_arguments() {
        let call = ToolCall::parse(ToolName::GitStatus, &args(json!({"verbose": true}))).unwrap();
        assert_eq!(call, ToolCall::GitStatus);
        assert_eq!(call.name(), ToolName::GitStatus);
    }

    #[test]
    fn float_result_count_is_accepted() {
        let call =
            ToolCall::parse(ToolName::SearchWeb, &args(json!({"query": "rust", "num_results": 3.0})))
                .unwrap();
        match call {
            ToolCall::SearchWeb(search) => assert_eq!(search.num_results, Some(3.0)),
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_invalid_invocation() {
        let err = ToolCall::parse(ToolName::EditFile, &args(json!({"path": "a", "search": "x"})))
            .unwrap_err();
        match err {
            ToolError::InvalidInvocation(msg) => {
                assert!(msg.starts_with("edit_file:"));
                assert!(msg.contains("replace"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
