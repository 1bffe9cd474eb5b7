use devpilot_llm::LlmError;
use thiserror::Error;

/// Unified error type for the devpilot crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A user message arrived while an exchange was still processing.
    #[error("an exchange is already in progress, try again once it finishes")]
    Busy,
    /// Missing or unusable configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// The model call itself failed.
    #[error("model transport failed: {0}")]
    Transport(#[from] LlmError),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Failures at the tool dispatch level. Every variant is converted into an error envelope
/// for the model; none of them aborts the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Unknown tool name, missing required parameter or malformed argument.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
    /// The collaborator behind the tool raised.
    #[error("{0}")]
    CollaboratorFailure(String),
    /// The operator denied the confirmation.
    #[error("Cancelled by user")]
    UserCancelled,
    /// The exchange was stopped while the invocation was pending.
    #[error("Execution stopped by user")]
    Stopped,
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidInvocation(message.into())
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        ToolError::CollaboratorFailure(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_cancelled_message_is_exact() {
        assert_eq!(ToolError::UserCancelled.to_string(), "Cancelled by user");
    }

    #[test]
    fn transport_error_converts_from_llm_error() {
        let err: CoreError = LlmError::MissingApiKey.into();
        assert!(matches!(err, CoreError::Transport(LlmError::MissingApiKey)));
    }
}
