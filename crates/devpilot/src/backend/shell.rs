use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::error::ToolError;

/// Cut `s` to at most `max` chars.
pub(crate) fn truncate_output(s: &str, max: usize) -> (String, bool) {
    match s.char_indices().nth(max) {
        Some((end, _)) => (s[..end].to_string(), true),
        None => (s.to_string(), false),
    }
}

/// Execute a shell command via `/bin/sh -c`.
///
/// A non-zero exit or a timeout is reported in the payload. Only a failure to
/// spawn or wait on the shell is an error.
pub async fn run(
    command: &str,
    timeout: Duration,
    workdir: &Path,
    max_output_chars: usize,
) -> Result<Value, ToolError> {
    let start = Instant::now();

    let child = tokio::process::Command::new("/bin/sh")
        .arg("-c")
        .arg(command)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ToolError::collaborator(format!("failed to spawn shell: {e}")))?;

    let result = tokio::time::timeout(timeout, child.wait_with_output()).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(output)) => {
            let (stdout, stdout_truncated) =
                truncate_output(&String::from_utf8_lossy(&output.stdout), max_output_chars);
            let (stderr, stderr_truncated) =
                truncate_output(&String::from_utf8_lossy(&output.stderr), max_output_chars);
            let exit_code = output.status.code().unwrap_or(-1);

            Ok(json!({
                "stdout": stdout,
                "stderr": stderr,
                "exitCode": exit_code,
                "timedOut": false,
                "truncated": stdout_truncated || stderr_truncated,
                "command": command,
                "durationMs": duration_ms,
            }))
        }
        Ok(Err(e)) => Err(ToolError::collaborator(format!("command failed: {e}"))),
        Err(_) => Ok(json!({
            "stdout": "",
            "stderr": format!("command timed out after {}ms", timeout.as_millis()),
            "exitCode": -1,
            "timedOut": true,
            "truncated": false,
            "command": command,
            "durationMs": duration_ms,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(120);

    #[tokio::test]
    async fn echo_captures_stdout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run("echo hello", LONG, dir.path(), 1000).await.expect("run");
        assert_eq!(result["stdout"].as_str().unwrap().trim(), "hello");
        assert_eq!(result["exitCode"].as_i64().unwrap(), 0);
        assert!(!result["timedOut"].as_bool().unwrap());
    }

    #[tokio::test]
    async fn non_zero_exit_is_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run("echo oops >&2; exit 42", LONG, dir.path(), 1000)
            .await
            .expect("run");
        assert_eq!(result["exitCode"].as_i64().unwrap(), 42);
        assert_eq!(result["stderr"].as_str().unwrap().trim(), "oops");
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run("sleep 10", Duration::from_millis(100), dir.path(), 1000)
            .await
            .expect("run");
        assert!(result["timedOut"].as_bool().unwrap());
        assert_eq!(result["exitCode"].as_i64().unwrap(), -1);
    }

    #[tokio::test]
    async fn missing_workdir_is_collaborator_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = run("true", LONG, &dir.path().join("absent"), 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::CollaboratorFailure(_)));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let (out, truncated) = truncate_output("héllo", 2);
        assert_eq!(out, "hé");
        assert!(truncated);
        let (out, truncated) = truncate_output("日本語", 3);
        assert_eq!(out, "日本語");
        assert!(!truncated);
        let (out, truncated) = truncate_output("short", 10);
        assert_eq!(out, "short");
        assert!(!truncated);
    }
}
