use devpilot_llm::{Message, ToolInvocationRequest};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult, ToolError};
use crate::tasks::TaskLedger;
use crate::tools::ToolEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControllerPhase {
    Idle,
    AwaitingModel,
    DispatchingTools,
    Done,
    Failed,
}

/// Everything one session owns: history, ledger and the processing flag.
///
/// Each exchange runs under a generation number. Stopping or resetting bumps
/// the generation, after which writes from the abandoned loop are refused.
pub struct ExchangeState {
    messages: Vec<Message>,
    ledger: TaskLedger,
    is_processing: bool,
    phase: ControllerPhase,
    generation: u64,
    cancel: Option<CancellationToken>,
    /// Invocations announced to the model that still lack a result turn.
    open_calls: Vec<(String, String)>,
}

impl ExchangeState {
    pub fn new(ledger: TaskLedger) -> Self {
        Self {
            messages: Vec::new(),
            ledger,
            is_processing: false,
            phase: ControllerPhase::Idle,
            generation: 0,
            cancel: None,
            open_calls: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TaskLedger {
        &mut self.ledger
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_processing && self.generation == generation
    }

    /// Start a new exchange. The ledger is cleared; history is kept.
    pub fn begin(&mut self) -> CoreResult<(u64, CancellationToken)> {
        if self.is_processing {
            return Err(CoreError::Busy);
        }
        self.generation += 1;
        self.is_processing = true;
        self.phase = ControllerPhase::AwaitingModel;
        self.open_calls.clear();
        self.ledger.clear();
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        Ok((self.generation, token))
    }

    /// Clear the flag if `generation` still owns the state.
    pub fn finish(&mut self, generation: u64, phase: ControllerPhase) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.is_processing = false;
        self.phase = phase;
        self.cancel = None;
        true
    }

    pub fn set_phase(&mut self, phase: ControllerPhase) {
        self.phase = phase;
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append the assistant turn that lists `calls` and track them as open.
    pub fn push_tool_calls(&mut self, calls: Vec<ToolInvocationRequest>) {
        self.open_calls = calls
            .iter()
            .map(|call| (call.id.clone(), call.name.clone()))
            .collect();
        self.messages.push(Message::tool_calls(calls));
    }

    pub fn push_tool_result(&mut self, call_id: &str, name: &str, result: Value) {
        self.open_calls.retain(|(id, _)| id != call_id);
        self.messages
            .push(Message::tool_result(call_id, name, result));
    }

    /// Abandon the running exchange, if any.
    ///
    /// Cancels its token, fails unfinished tasks and closes open invocations
    /// with a stopped envelope so the history stays well-formed.
    pub fn abandon(&mut self) -> bool {
        if !self.is_processing {
            return false;
        }
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.generation += 1;
        self.is_processing = false;
        self.phase = ControllerPhase::Idle;

        let reason = ToolError::Stopped.to_string();
        let stopped = ToolEnvelope::error(reason.clone()).to_value();
        for (id, name) in std::mem::take(&mut self.open_calls) {
            self.messages
                .push(Message::tool_result(id, name, stopped.clone()));
        }
        self.ledger.fail_open(&reason);
        true
    }

    /// Drop history and tasks. Stops a running exchange first.
    pub fn reset(&mut self) {
        self.abandon();
        self.messages.clear();
        self.open_calls.clear();
        self.ledger.clear();
        self.phase = ControllerPhase::Idle;
    }
}
