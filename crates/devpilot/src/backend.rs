//! Local collaborators: workspace filesystem, shell, git, web search and
//! the editor's active file.

pub mod fs;
pub mod git;
pub mod shell;
pub mod web;

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{AgentConfig, SearchSettings};
use crate::error::ToolError;
use crate::tools::call::{
    DeleteFileArgs, EditFileArgs, ExecuteCommandArgs, GitCommitArgs, PathArgs, SearchWebArgs,
    WriteFileArgs,
};
use crate::tools::ToolBackend;

pub struct LocalBackend {
    root: PathBuf,
    command_timeout: Duration,
    max_output_chars: usize,
    search: SearchSettings,
    http: reqwest::Client,
    active_file: Arc<RwLock<Option<PathBuf>>>,
}

impl std::fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBackend")
            .field("root", &self.root)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>, config: &AgentConfig) -> Self {
        Self {
            root: root.into(),
            command_timeout: Duration::from_millis(config.preferences.command_timeout_ms),
            max_output_chars: config.preferences.max_output_chars,
            search: config.search.clone(),
            http: reqwest::Client::new(),
            active_file: Arc::new(RwLock::new(None)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record the file the host editor has open. `None` clears it.
    pub fn set_active_file(&self, path: Option<PathBuf>) {
        if let Ok(mut guard) = self.active_file.write() {
            *guard = path.map(|p| self.resolve(&p.to_string_lossy()));
        }
    }

    pub fn active_file(&self) -> Option<PathBuf> {
        self.active_file.read().ok().and_then(|guard| guard.clone())
    }

    /// Relative paths are joined onto the workspace root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

#[async_trait]
impl ToolBackend for LocalBackend {
    async fn execute_command(&self, args: &ExecuteCommandArgs) -> Result<Value, ToolError> {
        let workdir = match args.cwd.as_deref() {
            Some(cwd) if !cwd.trim().is_empty() => self.resolve(cwd),
            _ => self.root.clone(),
        };
        shell::run(
            &args.command,
            self.command_timeout,
            &workdir,
            self.max_output_chars,
        )
        .await
    }

    async fn read_file(&self, args: &PathArgs) -> Result<Value, ToolError> {
        fs::read_file(&self.resolve(&args.path), &args.path).await
    }

    async fn write_file(&self, args: &WriteFileArgs) -> Result<Value, ToolError> {
        fs::write_file(&self.resolve(&args.path), &args.path, &args.content).await
    }

    async fn edit_file(&self, args: &EditFileArgs) -> Result<Value, ToolError> {
        fs::edit_file(
            &self.resolve(&args.path),
            &args.path,
            &args.search,
            &args.replace,
        )
        .await
    }

    async fn delete_file(&self, args: &DeleteFileArgs) -> Result<Value, ToolError> {
        fs::delete(&self.resolve(&args.path), &args.path, args.recursive).await
    }

    async fn create_directory(&self, args: &PathArgs) -> Result<Value, ToolError> {
        fs::create_directory(&self.resolve(&args.path), &args.path).await
    }

    async fn list_directory(&self, args: &PathArgs) -> Result<Value, ToolError> {
        fs::list_directory(&self.resolve(&args.path), &args.path).await
    }

    async fn search_web(&self, args: &SearchWebArgs) -> Result<Value, ToolError> {
        web::google_search(&self.http, &self.search, &args.query, args.num_results).await
    }

    async fn git_status(&self) -> Result<Value, ToolError> {
        git::status(&self.root).await
    }

    async fn git_commit(&self, args: &GitCommitArgs) -> Result<Value, ToolError> {
        git::commit(&self.root, &args.message, &args.files).await
    }

    async fn get_current_file(&self) -> Result<Value, ToolError> {
        let Some(path) = self.active_file() else {
            return Ok(Value::Null);
        };
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ToolError::collaborator(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok(json!({
            "path": path.to_string_lossy(),
            "content": content,
        }))
    }
}
