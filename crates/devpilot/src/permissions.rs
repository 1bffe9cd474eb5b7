//! Confirmation flow for sensitive tools.

pub mod approval;
pub mod enforcement;
pub mod gate;

pub use approval::{ApprovalSource, ConfirmationDecision, ConfirmationRequest};
pub use enforcement::{enforce_permissions, EnforcementResult};
pub use gate::{ConfirmationGate, GateOutcome};
