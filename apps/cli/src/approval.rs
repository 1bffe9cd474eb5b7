use async_trait::async_trait;
use devpilot::{ApprovalSource, ConfirmationDecision, ConfirmationRequest};
use tokio::sync::{mpsc, oneshot};

/// A prompt waiting for the operator's next line of input.
pub struct PendingApproval {
    pub request: ConfirmationRequest,
    pub reply: oneshot::Sender<ConfirmationDecision>,
}

/// Forwards confirmation requests to the input loop.
pub struct TerminalApproval {
    sender: mpsc::UnboundedSender<PendingApproval>,
}

impl TerminalApproval {
    pub fn new(sender: mpsc::UnboundedSender<PendingApproval>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ApprovalSource for TerminalApproval {
    async fn request_approval(&self, request: ConfirmationRequest) -> ConfirmationDecision {
        let (reply, answer) = oneshot::channel();
        if self.sender.send(PendingApproval { request, reply }).is_err() {
            log::warn!("input loop is gone, denying confirmation");
            return ConfirmationDecision::Deny;
        }
        answer.await.unwrap_or(ConfirmationDecision::Deny)
    }
}
