use devpilot_llm::Message;
use serde::Serialize;
use serde_json::Value;

use crate::tasks::Task;

/// Events delivered to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CoreEvent {
    AddMessage(AddMessagePayload),
    UpdateTasks(UpdateTasksPayload),
    ToolOutput(ToolOutputPayload),
    ClearChat,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddMessagePayload {
    pub message: Message,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateTasksPayload {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolOutputPayload {
    pub tool_name: String,
    pub output: Value,
}

impl CoreEvent {
    pub fn add_message(message: Message) -> Self {
        CoreEvent::AddMessage(AddMessagePayload { message })
    }

    pub fn update_tasks(tasks: Vec<Task>) -> Self {
        CoreEvent::UpdateTasks(UpdateTasksPayload { tasks })
    }

    pub fn tool_output(tool_name: impl Into<String>, output: Value) -> Self {
        CoreEvent::ToolOutput(ToolOutputPayload {
            tool_name: tool_name.into(),
            output,
        })
    }
}
