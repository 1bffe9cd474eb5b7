//! Decides whether an invocation may run without asking.

use crate::tools::{RiskLevel, ToolSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnforcementResult {
    /// The tool is allowed to execute.
    Allowed,
    /// The tool requires operator confirmation before execution.
    NeedsConfirmation { confirmation_id: String },
}

/// Decision logic:
/// 1. `auto_execute` → `Allowed`
/// 2. Safe → `Allowed`
/// 3. Sensitive → `NeedsConfirmation`
///
/// Confirmation ID format: `"confirm-{call_id}-{tool_name}"`.
pub fn enforce_permissions(tool: &ToolSpec, auto_execute: bool, call_id: &str) -> EnforcementResult {
    if auto_execute {
        return EnforcementResult::Allowed;
    }
    match tool.risk_level {
        RiskLevel::Safe => EnforcementResult::Allowed,
        RiskLevel::Sensitive => EnforcementResult::NeedsConfirmation {
            confirmation_id: format!("confirm-{call_id}-{}", tool.name),
        },
    }
}
