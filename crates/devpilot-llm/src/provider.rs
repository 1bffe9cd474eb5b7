use async_trait::async_trait;

use crate::error::LlmError;
use crate::message::{Message, ToolInvocationRequest};
use crate::tool::ToolSchema;

/// One model reply: either final text, or a set of requested tool invocations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_invocations: Vec<ToolInvocationRequest>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_invocations: Vec::new(),
        }
    }

    pub fn tool_calls(tool_invocations: Vec<ToolInvocationRequest>) -> Self {
        Self {
            text: None,
            tool_invocations,
        }
    }

    pub fn has_tool_invocations(&self) -> bool {
        !self.tool_invocations.is_empty()
    }
}

/// Stateless chat transport. The full history is resent on every call.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(
        &self,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ModelResponse, LlmError>;
}
