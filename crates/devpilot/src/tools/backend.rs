use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::tools::call::{
    DeleteFileArgs, EditFileArgs, ExecuteCommandArgs, GitCommitArgs, PathArgs, SearchWebArgs,
    WriteFileArgs,
};

/// Collaborators that carry out tool invocations.
///
/// Each method returns the JSON payload placed under `data` in the result
/// envelope, or a [`ToolError`] whose message ends up under `error`.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    async fn execute_command(&self, args: &ExecuteCommandArgs) -> Result<Value, ToolError>;
    async fn read_file(&self, args: &PathArgs) -> Result<Value, ToolError>;
    async fn write_file(&self, args: &WriteFileArgs) -> Result<Value, ToolError>;
    async fn edit_file(&self, args: &EditFileArgs) -> Result<Value, ToolError>;
    async fn delete_file(&self, args: &DeleteFileArgs) -> Result<Value, ToolError>;
    async fn create_directory(&self, args: &PathArgs) -> Result<Value, ToolError>;
    async fn list_directory(&self, args: &PathArgs) -> Result<Value, ToolError>;
    async fn search_web(&self, args: &SearchWebArgs) -> Result<Value, ToolError>;
    async fn git_status(&self) -> Result<Value, ToolError>;
    async fn git_commit(&self, args: &GitCommitArgs) -> Result<Value, ToolError>;
    async fn get_current_file(&self) -> Result<Value, ToolError>;
}
