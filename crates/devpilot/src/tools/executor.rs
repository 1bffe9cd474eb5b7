use std::sync::Arc;
use std::time::Instant;

use devpilot_llm::ToolInvocationRequest;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tools::backend::ToolBackend;
use crate::tools::call::ToolCall;
use crate::tools::registry::ToolRegistry;
use crate::tools::schema::ToolSpec;

/// An invocation that passed validation and is ready for the gate.
#[derive(Debug, Clone)]
pub struct PreparedInvocation {
    pub call_id: String,
    pub spec: ToolSpec,
    pub call: ToolCall,
    pub arguments: Map<String, Value>,
}

impl PreparedInvocation {
    pub fn is_sensitive(&self) -> bool {
        self.spec.is_sensitive()
    }
}

/// Validates invocations against the registry and routes them to the backend.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn ToolBackend>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, backend: Arc<dyn ToolBackend>) -> Self {
        Self { registry, backend }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn prepare(&self, request: &ToolInvocationRequest) -> Result<PreparedInvocation, ToolError> {
        let (spec, call) = self.registry.resolve(request)?;
        Ok(PreparedInvocation {
            call_id: request.id.clone(),
            spec: spec.clone(),
            call,
            arguments: request.arguments.clone(),
        })
    }

    /// Run a prepared invocation. Collaborator errors are returned, not raised.
    pub async fn run(&self, prepared: &PreparedInvocation) -> Result<Value, ToolError> {
        let started = Instant::now();
        let result = self.dispatch(&prepared.call).await;
        debug!(
            "tool {} ({}) finished in {}ms ok={}",
            prepared.spec.name,
            prepared.call_id,
            started.elapsed().as_millis(),
            result.is_ok()
        );
        result
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let backend = self.backend.as_ref();
        match call {
            ToolCall::ExecuteCommand(args) => backend.execute_command(args).await,
            ToolCall::ReadFile(args) => backend.read_file(args).await,
            ToolCall::WriteFile(args) => backend.write_file(args).await,
            ToolCall::EditFile(args) => backend.edit_file(args).await,
            ToolCall::DeleteFile(args) => backend.delete_file(args).await,
            ToolCall::CreateDirectory(args) => backend.create_directory(args).await,
            ToolCall::ListDirectory(args) => backend.list_directory(args).await,
            ToolCall::SearchWeb(args) => backend.search_web(args).await,
            ToolCall::GitStatus => backend.git_status().await,
            ToolCall::GitCommit(args) => backend.git_commit(args).await,
            ToolCall::GetCurrentFile => backend.get_current_file().await,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tools::call::{
        DeleteFileArgs, EditFileArgs, ExecuteCommandArgs, GitCommitArgs, PathArgs, SearchWebArgs,
        WriteFileArgs,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::tools::envelope::ToolEnvelope;

    impl ToolExecutor {
        /// Validate and run without gating, normalized into an envelope.
        async fn execute(&self, request: &ToolInvocationRequest) -> ToolEnvelope {
            let result = match self.prepare(request) {
                Ok(prepared) => self.run(&prepared).await,
                Err(err) => Err(err),
            };
            ToolEnvelope::from(result)
        }
    }

    /// Records every dispatched call and answers with a canned payload.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub calls: Mutex<Vec<ToolCall>>,
        pub fail_with: Mutex<Option<String>>,
    }

    impl RecordingBackend {
        pub(crate) fn calls(&self) -> Vec<ToolCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: ToolCall) -> Result<Value, ToolError> {
            let name = call.name();
            self.calls.lock().unwrap().push(call);
            match self.fail_with.lock().unwrap().clone() {
                Some(message) => Err(ToolError::collaborator(message)),
                None => Ok(json!({ "tool": name.as_str() })),
            }
        }
    }

    #[async_trait]
    impl ToolBackend for RecordingBackend {
        async fn execute_command(&self, args: &ExecuteCommandArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::ExecuteCommand(args.clone()))
        }
        async fn read_file(&self, args: &PathArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::ReadFile(args.clone()))
        }
        async fn write_file(&self, args: &WriteFileArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::WriteFile(args.clone()))
        }
        async fn edit_file(&self, args: &EditFileArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::EditFile(args.clone()))
        }
        async fn delete_file(&self, args: &DeleteFileArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::DeleteFile(args.clone()))
        }
        async fn create_directory(&self, args: &PathArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::CreateDirectory(args.clone()))
        }
        async fn list_directory(&self, args: &PathArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::ListDirectory(args.clone()))
        }
        async fn search_web(&self, args: &SearchWebArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::SearchWeb(args.clone()))
        }
        async fn git_status(&self) -> Result<Value, ToolError> {
            self.record(ToolCall::GitStatus)
        }
        async fn git_commit(&self, args: &GitCommitArgs) -> Result<Value, ToolError> {
            self.record(ToolCall::GitCommit(args.clone()))
        }
        async fn get_current_file(&self) -> Result<Value, ToolError> {
            self.record(ToolCall::GetCurrentFile)
        }
    }

    fn executor(backend: Arc<RecordingBackend>) -> ToolExecutor {
        ToolExecutor::new(Arc::new(ToolRegistry::new()), backend)
    }

    fn request(name: &str, arguments: Value) -> ToolInvocationRequest {
        let arguments: Map<String, Value> = arguments.as_object().cloned().unwrap_or_default();
        ToolInvocationRequest::new(name, arguments)
    }

    #[tokio::test]
    async fn execute_routes_to_backend_and_wraps_data() {
        let backend = Arc::new(RecordingBackend::default());
        let envelope = executor(backend.clone())
            .execute(&request("list_directory", json!({"path": "."})))
            .await;
        assert_eq!(envelope, ToolEnvelope::data(json!({"tool": "list_directory"})));
        assert_eq!(
            backend.calls(),
            vec![ToolCall::ListDirectory(PathArgs { path: ".".into() })]
        );
    }

    #[tokio::test]
    async fn invalid_invocation_never_reaches_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let envelope = executor(backend.clone())
            .execute(&request("read_file", json!({})))
            .await;
        assert_eq!(
            envelope.error_message(),
            Some("invalid invocation: missing required parameter: 'path'")
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn collaborator_failure_becomes_error_envelope() {
        let backend = Arc::new(RecordingBackend::default());
        *backend.fail_with.lock().unwrap() = Some("disk full".into());
        let envelope = executor(backend)
            .execute(&request("write_file", json!({"path": "a", "content": "b"})))
            .await;
        assert_eq!(envelope, ToolEnvelope::error("disk full"));
    }

    #[test]
    fn prepare_keeps_call_id_and_sensitivity() {
        let backend = Arc::new(RecordingBackend::default());
        let req = request("execute_command", json!({"command": "ls"}));
        let prepared = executor(backend).prepare(&req).unwrap();
        assert_eq!(prepared.call_id, req.id);
        assert!(prepared.is_sensitive());
    }
}
