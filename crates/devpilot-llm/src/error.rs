use thiserror::Error;

/// Failures raised by the model transport.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("missing LLM API key")]
    MissingApiKey,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LlmError {
    /// Whether the failure comes from missing or invalid settings rather than the network.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingApiKey | LlmError::InvalidInput(_))
    }
}
