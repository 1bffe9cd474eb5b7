pub mod error;
pub mod event;
pub mod bus;
pub mod config;

pub mod tools;
pub mod backend;
pub mod permissions;
pub mod tasks;
pub mod conversation;

pub use crate::backend::LocalBackend;
pub use crate::bus::Bus;
pub use crate::config::{AgentConfig, AgentPreferences, SearchSettings};
pub use crate::conversation::{
    ConversationController, ControllerPhase, ExchangeOutcome, ExchangeState,
};
pub use crate::error::{CoreError, CoreResult, ToolError};
pub use crate::event::CoreEvent;
pub use crate::permissions::{
    ApprovalSource, ConfirmationDecision, ConfirmationGate, ConfirmationRequest, GateOutcome,
};
pub use crate::tasks::{Task, TaskLedger, TaskStatus, TaskUpdate};
pub use crate::tools::{ToolBackend, ToolCall, ToolEnvelope, ToolExecutor, ToolRegistry};
pub use devpilot_llm as llm;
