use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The operator's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationDecision {
    Allow,
    Deny,
}

impl ConfirmationDecision {
    pub fn is_allowed(self) -> bool {
        self == ConfirmationDecision::Allow
    }
}

/// What the operator is asked to approve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub confirmation_id: String,
    pub tool_name: String,
    pub arguments: Map<String, Value>,
}

impl ConfirmationRequest {
    /// One-line prompt text, e.g. `Allow execute_command {"command":"ls"}?`
    pub fn prompt(&self) -> String {
        let args = serde_json::to_string(&self.arguments).unwrap_or_default();
        format!("Allow {} {}?", self.tool_name, args)
    }
}

/// Host-side channel to the operator. The host decides how to ask.
#[async_trait]
pub trait ApprovalSource: Send + Sync {
    async fn request_approval(&self, request: ConfirmationRequest) -> ConfirmationDecision;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_includes_tool_and_arguments() {
        let request = ConfirmationRequest {
            confirmation_id: "confirm-1-execute_command".into(),
            tool_name: "execute_command".into(),
            arguments: json!({"command": "ls"}).as_object().cloned().unwrap(),
        };
        assert_eq!(request.prompt(), r#"Allow execute_command {"command":"ls"}?"#);
    }
}
