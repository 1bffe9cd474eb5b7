//! Workspace filesystem operations.
//!
//! `full` is the resolved path, `display` the path as the model gave it. The
//! latter is echoed back in payloads and error messages.

use std::io::ErrorKind;
use std::path::Path;

use serde_json::{json, Value};

use crate::error::ToolError;

fn io_failure(action: &str, display: &str, err: std::io::Error) -> ToolError {
    ToolError::collaborator(format!("failed to {action} {display}: {err}"))
}

pub async fn read_file(full: &Path, display: &str) -> Result<Value, ToolError> {
    let content = tokio::fs::read_to_string(full)
        .await
        .map_err(|e| io_failure("read", display, e))?;
    Ok(json!({ "path": display, "content": content }))
}

pub async fn write_file(full: &Path, display: &str, content: &str) -> Result<Value, ToolError> {
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_failure("create parent directories for", display, e))?;
    }
    tokio::fs::write(full, content)
        .await
        .map_err(|e| io_failure("write", display, e))?;
    Ok(json!({ "success": true, "path": display }))
}

/// Replace every literal occurrence of `search`. Zero matches is not an error.
pub async fn edit_file(
    full: &Path,
    display: &str,
    search: &str,
    replace: &str,
) -> Result<Value, ToolError> {
    if search.is_empty() {
        return Err(ToolError::invalid("edit_file: search text must not be empty"));
    }
    let original = tokio::fs::read_to_string(full)
        .await
        .map_err(|e| io_failure("read", display, e))?;
    let replacements = original.matches(search).count();
    if replacements > 0 {
        let updated = original.replace(search, replace);
        tokio::fs::write(full, updated)
            .await
            .map_err(|e| io_failure("write", display, e))?;
    }
    Ok(json!({
        "success": true,
        "path": display,
        "replacements": replacements,
    }))
}

pub async fn delete(full: &Path, display: &str, recursive: bool) -> Result<Value, ToolError> {
    if recursive {
        match tokio::fs::remove_dir_all(full).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            // remove_dir_all refuses plain files
            Err(_) if full.is_file() => tokio::fs::remove_file(full)
                .await
                .map_err(|e| io_failure("delete", display, e))?,
            Err(e) => return Err(io_failure("delete", display, e)),
        }
    } else {
        tokio::fs::remove_file(full)
            .await
            .map_err(|e| io_failure("delete", display, e))?;
    }
    Ok(json!({ "success": true, "path": display }))
}

pub async fn create_directory(full: &Path, display: &str) -> Result<Value, ToolError> {
    tokio::fs::create_dir_all(full)
        .await
        .map_err(|e| io_failure("create directory", display, e))?;
    Ok(json!({ "success": true, "path": display }))
}

pub async fn list_directory(full: &Path, display: &str) -> Result<Value, ToolError> {
    let mut reader = tokio::fs::read_dir(full)
        .await
        .map_err(|e| io_failure("list", display, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| io_failure("list", display, e))?
    {
        let mut name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry
            .file_type()
            .await
            .map(|kind| kind.is_dir())
            .unwrap_or(false);
        if is_dir {
            name.push('/');
        }
        entries.push(name);
    }
    entries.sort();

    Ok(json!({ "path": display, "entries": entries }))
}
