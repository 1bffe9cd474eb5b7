pub mod error;
pub mod message;
pub mod openai;
pub mod provider;
pub mod settings;
pub mod tool;

pub use error::LlmError;
pub use message::{Message, MessageContent, Role, ToolInvocationRequest};
pub use openai::OpenAiCompatibleProvider;
pub use provider::{LlmProvider, ModelResponse};
pub use settings::LlmSettings;
pub use tool::ToolSchema;
