use std::path::Path;
use std::process::{Output, Stdio};

use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;

async fn run_git(root: &Path, args: &[&str]) -> Result<Output, ToolError> {
    debug!("git {}", args.join(" "));
    tokio::process::Command::new("git")
        .args(args)
        .current_dir(root)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ToolError::collaborator(format!("failed to run git: {e}")))
}

fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

fn checked(output: Output, action: &str) -> Result<Output, ToolError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(ToolError::collaborator(format!(
            "git {action} failed: {}",
            combined(&output).trim()
        )))
    }
}

/// Strip control characters other than newline and tab, then trim.
pub fn sanitize_commit_message(message: &str) -> Result<String, ToolError> {
    let cleaned: String = message
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ToolError::invalid("git_commit: commit message is empty"));
    }
    Ok(cleaned.to_string())
}

pub async fn status(root: &Path) -> Result<Value, ToolError> {
    let output = checked(run_git(root, &["status", "--porcelain"]).await?, "status")?;
    let text = String::from_utf8_lossy(&output.stdout).to_string();
    Ok(json!({
        "clean": text.trim().is_empty(),
        "output": text,
    }))
}

/// Stage `files`, or everything when `files` is empty and the index is clean,
/// then commit.
pub async fn commit(root: &Path, message: &str, files: &[String]) -> Result<Value, ToolError> {
    let message = sanitize_commit_message(message)?;

    if !files.is_empty() {
        let mut args = vec!["add", "--"];
        args.extend(files.iter().map(String::as_str));
        checked(run_git(root, &args).await?, "add")?;
    } else {
        let staged = checked(
            run_git(root, &["diff", "--cached", "--name-only"]).await?,
            "diff",
        )?;
        if String::from_utf8_lossy(&staged.stdout).trim().is_empty() {
            checked(run_git(root, &["add", "-A"]).await?, "add")?;
        }
    }

    let output = checked(run_git(root, &["commit", "-m", &message]).await?, "commit")?;
    Ok(json!({
        "success": true,
        "message": message,
        "output": combined(&output),
    }))
}
