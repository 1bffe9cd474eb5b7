//! Tool registry, typed invocations and dispatch.

pub mod backend;
pub mod call;
pub mod envelope;
pub mod executor;
pub mod registry;
pub mod schema;

pub use backend::ToolBackend;
pub use call::ToolCall;
pub use envelope::ToolEnvelope;
pub use executor::{PreparedInvocation, ToolExecutor};
pub use registry::ToolRegistry;
pub use schema::{validate_schema, RiskLevel, ToolName, ToolSpec};
