use std::collections::HashMap;

use devpilot::llm::Role;
use devpilot::{CoreEvent, TaskStatus};
use tokio::sync::broadcast;

const MAX_TOOL_OUTPUT_CHARS: usize = 600;

/// Print bus events until the channel closes.
pub async fn render_events(mut events: broadcast::Receiver<CoreEvent>) {
    let mut seen: HashMap<String, TaskStatus> = HashMap::new();
    loop {
        match events.recv().await {
            Ok(event) => render(&event, &mut seen),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("renderer lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn render(event: &CoreEvent, seen: &mut HashMap<String, TaskStatus>) {
    match event {
        CoreEvent::AddMessage(payload) => {
            if payload.message.role == Role::Assistant {
                if let Some(text) = payload.message.text() {
                    println!("\nassistant> {text}\n");
                }
            }
        }
        CoreEvent::UpdateTasks(payload) => {
            for task in &payload.tasks {
                if seen.get(&task.id) == Some(&task.status) {
                    continue;
                }
                seen.insert(task.id.clone(), task.status);
                match &task.error {
                    Some(error) => println!("  [{}] {} ({error})", task.status, task.description),
                    None => println!("  [{}] {}", task.status, task.description),
                }
            }
            if payload.tasks.is_empty() {
                seen.clear();
            }
        }
        CoreEvent::ToolOutput(payload) => {
            let output = serde_json::to_string(&payload.output).unwrap_or_default();
            println!("  {} -> {}", payload.tool_name, clip(&output));
        }
        CoreEvent::ClearChat => {
            seen.clear();
            println!("\n--- new conversation ---\n");
        }
    }
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_TOOL_OUTPUT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_TOOL_OUTPUT_CHARS).collect();
    format!("{cut}...")
}
