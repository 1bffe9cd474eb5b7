use std::sync::{Arc, Mutex, MutexGuard};

use devpilot_llm::{LlmProvider, Message, ModelResponse, ToolInvocationRequest};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::Bus;
use crate::config::AgentConfig;
use crate::conversation::outcome::ExchangeOutcome;
use crate::conversation::state::{ControllerPhase, ExchangeState};
use crate::error::{CoreError, CoreResult, ToolError};
use crate::event::CoreEvent;
use crate::permissions::{ConfirmationGate, GateOutcome};
use crate::tasks::{Task, TaskLedger, TaskUpdate};
use crate::tools::{ToolEnvelope, ToolExecutor};

pub const STOP_NOTICE: &str = "Execution stopped by user.";
pub const BUSY_NOTICE: &str =
    "Still working on the previous request. Wait for it to finish or stop it, then try again.";
pub const EMPTY_ANSWER_NOTICE: &str = "The model returned an empty response.";
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Why the loop left early without an outcome of its own.
enum Halt {
    /// Stopped or reset; the exchange no longer owns the state.
    Stale,
    Internal(CoreError),
}

/// Drives one session: appends turns, calls the model, gates and runs tools.
pub struct ConversationController {
    provider: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    gate: ConfirmationGate,
    bus: Bus,
    system_prompt: String,
    max_iterations: u32,
    pub(super) state: Mutex<ExchangeState>,
}

/// Clears `is_processing` on every exit path of `submit`, including a dropped future.
struct ProcessingGuard<'a> {
    state: &'a Mutex<ExchangeState>,
    generation: u64,
    phase: ControllerPhase,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.finish(self.generation, self.phase);
        }
    }
}

impl ConversationController {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        executor: ToolExecutor,
        gate: ConfirmationGate,
        bus: Bus,
        config: &AgentConfig,
    ) -> Self {
        let mut ledger = TaskLedger::new();
        let sink = bus.clone();
        ledger.subscribe(Box::new(move |tasks| {
            sink.publish(CoreEvent::update_tasks(tasks));
        }));

        Self {
            provider,
            executor,
            gate,
            bus,
            system_prompt: config.llm.system_prompt.clone(),
            max_iterations: config.preferences.max_iterations.max(1),
            state: Mutex::new(ExchangeState::new(ledger)),
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.bus.subscribe()
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn auto_execute(&self) -> bool {
        self.gate.auto_execute()
    }

    pub fn set_auto_execute(&self, enabled: bool) {
        info!("auto-execute {}", if enabled { "enabled" } else { "disabled" });
        self.gate.set_auto_execute(enabled);
    }

    pub fn is_processing(&self) -> bool {
        match self.lock() {
            Ok(state) => state.is_processing(),
            Err(error) => {
                warn!("cannot read processing flag: {error}");
                false
            }
        }
    }

    pub fn phase(&self) -> CoreResult<ControllerPhase> {
        Ok(self.lock()?.phase())
    }

    /// Owned history, without the system prompt.
    pub fn messages(&self) -> CoreResult<Vec<Message>> {
        Ok(self.lock()?.messages().to_vec())
    }

    pub fn tasks(&self) -> CoreResult<Vec<Task>> {
        Ok(self.lock()?.ledger().list())
    }

    /// Run one exchange for `text`.
    ///
    /// Returns [`CoreError::Busy`] when another exchange is still processing.
    /// Every other failure is reported through the outcome and a notice on the bus.
    pub async fn submit(&self, text: impl Into<String>) -> CoreResult<ExchangeOutcome> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::InvalidInput("message is empty".to_string()));
        }

        let user = Message::user(text);
        let (generation, cancel) = {
            let mut state = self.lock()?;
            match state.begin() {
                Ok(started) => {
                    state.push(user.clone());
                    started
                }
                Err(err) => {
                    self.notice(BUSY_NOTICE);
                    return Err(err);
                }
            }
        };
        self.bus.publish(CoreEvent::add_message(user));
        info!("exchange {generation} started");

        let mut guard = ProcessingGuard {
            state: &self.state,
            generation,
            phase: ControllerPhase::Failed,
        };

        let outcome = match self.run_exchange(generation, &cancel).await {
            Ok(outcome) => outcome,
            Err(Halt::Stale) => ExchangeOutcome::Stopped,
            Err(Halt::Internal(err)) => {
                let message = format!("Error: {err}");
                self.notice(&message);
                ExchangeOutcome::Failed(message)
            }
        };

        guard.phase = match &outcome {
            ExchangeOutcome::Answered(_) | ExchangeOutcome::IterationLimit { .. } => {
                ControllerPhase::Done
            }
            ExchangeOutcome::Failed(_) => ControllerPhase::Failed,
            ExchangeOutcome::Stopped => ControllerPhase::Idle,
        };
        drop(guard);

        info!("exchange {generation} finished: {}", outcome_kind(&outcome));
        Ok(outcome)
    }

    /// Abandon the running exchange. Returns false when nothing was running.
    pub fn stop(&self) -> bool {
        let stopped = match self.state.lock() {
            Ok(mut state) => state.abandon(),
            Err(_) => {
                warn!("exchange state lock poisoned, cannot stop");
                false
            }
        };
        if stopped {
            info!("exchange stopped by user");
            self.notice(STOP_NOTICE);
        }
        stopped
    }

    /// Forget history and tasks, stopping a running exchange first.
    pub fn new_conversation(&self) -> CoreResult<()> {
        self.lock()?.reset();
        self.bus.publish(CoreEvent::ClearChat);
        info!("conversation cleared");
        Ok(())
    }

    async fn run_exchange(
        &self,
        generation: u64,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, Halt> {
        let schemas = self.executor.registry().schemas();

        for iteration in 1..=self.max_iterations {
            let history = self.with_current(generation, |state| {
                state.set_phase(ControllerPhase::AwaitingModel);
                self.history(state.messages())
            })?;
            debug!(
                "model call {iteration}/{} with {} messages",
                self.max_iterations,
                history.len()
            );

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Halt::Stale),
                response = self.provider.chat(&history, &schemas) => response,
            };

            let ModelResponse {
                text,
                tool_invocations,
            } = match response {
                Ok(response) => response,
                Err(err) => {
                    warn!("model call failed: {err}");
                    let err = if err.is_configuration() {
                        CoreError::Config(err.to_string())
                    } else {
                        CoreError::Transport(err)
                    };
                    let message = format!("Error: {err}");
                    self.with_current(generation, |_| ())?;
                    self.notice(&message);
                    return Ok(ExchangeOutcome::Failed(message));
                }
            };

            if tool_invocations.is_empty() {
                return self.answer(generation, text);
            }

            debug!("model requested {} tool(s)", tool_invocations.len());
            self.with_current(generation, |state| {
                state.set_phase(ControllerPhase::DispatchingTools);
                if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
                    let message = Message::assistant(text);
                    state.push(message.clone());
                    self.bus.publish(CoreEvent::add_message(message));
                }
                state.push_tool_calls(tool_invocations.clone());
            })?;

            for request in &tool_invocations {
                self.dispatch(generation, request, cancel).await?;
            }
        }

        let message = format!(
            "Reached the limit of {} iterations without a final answer. Send another message to continue.",
            self.max_iterations
        );
        self.with_current(generation, |_| ())?;
        warn!("exchange {generation} hit the iteration limit");
        self.notice(&message);
        Ok(ExchangeOutcome::IterationLimit {
            iterations: self.max_iterations,
        })
    }

    fn answer(&self, generation: u64, text: Option<String>) -> Result<ExchangeOutcome, Halt> {
        let text = text.unwrap_or_default();
        if text.trim().is_empty() {
            self.with_current(generation, |_| ())?;
            self.notice(EMPTY_ANSWER_NOTICE);
            return Ok(ExchangeOutcome::Answered(String::new()));
        }

        let message = Message::assistant(text.clone());
        self.with_current(generation, |state| state.push(message.clone()))?;
        self.bus.publish(CoreEvent::add_message(message));
        Ok(ExchangeOutcome::Answered(text))
    }

    /// Ledger, gate, run, result turn. Always appends exactly one result unless halted.
    async fn dispatch(
        &self,
        generation: u64,
        request: &ToolInvocationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), Halt> {
        if cancel.is_cancelled() {
            return Err(Halt::Stale);
        }
        let description = describe(request);
        let task = self.with_current(generation, |state| state.ledger_mut().create(description))?;
        debug!("dispatching {} ({})", request.name, request.id);

        let prepared = match self.executor.prepare(request) {
            Ok(prepared) => prepared,
            Err(err) => return self.settle(generation, &task.id, request, Err(err)),
        };

        match self.gate.check(&prepared, cancel).await {
            GateOutcome::Approved => {}
            GateOutcome::Denied => {
                return self.settle(generation, &task.id, request, Err(ToolError::UserCancelled))
            }
            GateOutcome::Cancelled => return Err(Halt::Stale),
        }

        self.with_current(generation, |state| {
            state.ledger_mut().update(&task.id, TaskUpdate::in_progress());
        })?;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Halt::Stale),
            result = self.executor.run(&prepared) => result,
        };
        self.settle(generation, &task.id, request, result)
    }

    fn settle(
        &self,
        generation: u64,
        task_id: &str,
        request: &ToolInvocationRequest,
        result: Result<Value, ToolError>,
    ) -> Result<(), Halt> {
        let update = match &result {
            Ok(_) => TaskUpdate::completed(),
            Err(err) => {
                debug!("tool {} failed: {err}", request.name);
                TaskUpdate::failed(err.to_string())
            }
        };
        let envelope = ToolEnvelope::from(result).to_value();

        self.with_current(generation, |state| {
            state.ledger_mut().update(task_id, update);
            state.push_tool_result(&request.id, &request.name, envelope.clone());
        })?;
        self.bus
            .publish(CoreEvent::tool_output(request.name.clone(), envelope));
        Ok(())
    }

    fn history(&self, messages: &[Message]) -> Vec<Message> {
        let mut history = Vec::with_capacity(messages.len() + 1);
        if !self.system_prompt.trim().is_empty() {
            history.push(Message::system(self.system_prompt.clone()));
        }
        history.extend_from_slice(messages);
        history
    }

    fn notice(&self, text: &str) {
        self.bus
            .publish(CoreEvent::add_message(Message::assistant(text)));
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, ExchangeState>> {
        self.state
            .lock()
            .map_err(|_| CoreError::Internal("exchange state lock poisoned".to_string()))
    }

    fn with_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut ExchangeState) -> R,
    ) -> Result<R, Halt> {
        let mut state = self.lock().map_err(Halt::Internal)?;
        if !state.is_current(generation) {
            return Err(Halt::Stale);
        }
        Ok(f(&mut state))
    }
}

fn describe(request: &ToolInvocationRequest) -> String {
    let args = serde_json::to_string(&request.arguments).unwrap_or_default();
    let description = format!("{}: {}", request.name, args);
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description;
    }
    let cut: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    format!("{cut}...")
}

fn outcome_kind(outcome: &ExchangeOutcome) -> &'static str {
    match outcome {
        ExchangeOutcome::Answered(_) => "answered",
        ExchangeOutcome::Failed(_) => "failed",
        ExchangeOutcome::Stopped => "stopped",
        ExchangeOutcome::IterationLimit { .. } => "iteration limit",
    }
}
