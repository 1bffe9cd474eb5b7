use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::permissions::approval::{ApprovalSource, ConfirmationRequest};
use crate::permissions::enforcement::{enforce_permissions, EnforcementResult};
use crate::tools::PreparedInvocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Approved,
    Denied,
    /// The exchange was stopped while the operator was being asked.
    Cancelled,
}

/// Asks the operator before sensitive tools run, unless auto-execute is on.
#[derive(Clone)]
pub struct ConfirmationGate {
    auto_execute: Arc<AtomicBool>,
    source: Arc<dyn ApprovalSource>,
}

impl ConfirmationGate {
    pub fn new(auto_execute: bool, source: Arc<dyn ApprovalSource>) -> Self {
        Self {
            auto_execute: Arc::new(AtomicBool::new(auto_execute)),
            source,
        }
    }

    pub fn auto_execute(&self) -> bool {
        self.auto_execute.load(Ordering::SeqCst)
    }

    pub fn set_auto_execute(&self, enabled: bool) {
        self.auto_execute.store(enabled, Ordering::SeqCst);
    }

    pub async fn check(
        &self,
        prepared: &PreparedInvocation,
        cancel: &CancellationToken,
    ) -> GateOutcome {
        let confirmation_id =
            match enforce_permissions(&prepared.spec, self.auto_execute(), &prepared.call_id) {
                EnforcementResult::Allowed => return GateOutcome::Approved,
                EnforcementResult::NeedsConfirmation { confirmation_id } => confirmation_id,
            };

        debug!("awaiting confirmation {confirmation_id}");
        let request = ConfirmationRequest {
            confirmation_id,
            tool_name: prepared.spec.name.to_string(),
            arguments: prepared.arguments.clone(),
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => GateOutcome::Cancelled,
            decision = self.source.request_approval(request) => {
                if decision.is_allowed() {
                    GateOutcome::Approved
                } else {
                    GateOutcome::Denied
                }
            }
        }
    }
}
