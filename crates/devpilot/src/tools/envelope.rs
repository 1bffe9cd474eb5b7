use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Uniform result handed back to the model: `{"data": ..}` or `{"error": ".."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolEnvelope {
    Data { data: Value },
    Error { error: String },
}

impl ToolEnvelope {
    pub fn data(data: Value) -> Self {
        ToolEnvelope::Data { data }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ToolEnvelope::Error {
            error: error.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolEnvelope::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolEnvelope::Error { error } => Some(error),
            ToolEnvelope::Data { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ToolEnvelope::Data { data } => serde_json::json!({ "data": data }),
            ToolEnvelope::Error { error } => serde_json::json!({ "error": error }),
        }
    }
}

impl From<Result<Value, ToolError>> for ToolEnvelope {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(data) => ToolEnvelope::data(data),
            Err(err) => ToolEnvelope::error(err.to_string()),
        }
    }
}
