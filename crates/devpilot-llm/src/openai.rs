//! OpenAI-compatible `/chat/completions` transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::LlmError;
use crate::message::{Message, MessageContent, Role, ToolInvocationRequest};
use crate::provider::{LlmProvider, ModelResponse};
use crate::settings::LlmSettings;
use crate::tool::ToolSchema;

pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    settings: LlmSettings,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| LlmError::InvalidInput(e.to_string()))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    async fn chat(
        &self,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ModelResponse, LlmError> {
        let headers = self.headers()?;
        let body = build_request_body(&self.settings, history, tools);
        tracing::debug!(
            "chat request model={} messages={} tools={}",
            self.settings.model,
            history.len(),
            tools.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        parse_response(&text)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ChatFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ChatFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn build_request_body(
    settings: &LlmSettings,
    history: &[Message],
    tools: &[ToolSchema],
) -> ChatRequest {
    ChatRequest {
        model: settings.model.clone(),
        messages: history.iter().map(message_to_wire).collect(),
        temperature: settings.temperature,
        max_tokens: settings.max_output_tokens,
        tools: tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect(),
    }
}

fn message_to_wire(message: &Message) -> Value {
    match (&message.role, &message.content) {
        (_, MessageContent::ToolCalls { calls }) => json!({
            "role": "assistant",
            "content": Value::Null,
            "tool_calls": calls
                .iter()
                .map(|call| json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": Value::Object(call.arguments.clone()).to_string(),
                    }
                }))
                .collect::<Vec<_>>(),
        }),
        (_, MessageContent::ToolResult { call_id, result, .. }) => json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": result.to_string(),
        }),
        (role, MessageContent::Text { text }) => {
            let role = match role {
                Role::System => "system",
                Role::Assistant => "assistant",
                Role::User | Role::ToolResult => "user",
            };
            json!({ "role": role, "content": text })
        }
    }
}

fn parse_response(body: &str) -> Result<ModelResponse, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Serialization(e.to_string()))?;
    let message = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| LlmError::Response("missing choices".to_string()))?;

    let tool_invocations = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            let arguments = parse_arguments(&call.function.name, &call.function.arguments);
            let mut request = ToolInvocationRequest::new(call.function.name, arguments);
            if let Some(id) = call.id.filter(|id| !id.is_empty()) {
                request.id = id;
            }
            request
        })
        .collect();

    Ok(ModelResponse {
        text: message.content.filter(|text| !text.trim().is_empty()),
        tool_invocations,
    })
}

/// Arguments arrive as a JSON string; anything that is not an object becomes an empty map
/// so required-parameter validation reports it back to the model.
fn parse_arguments(name: &str, raw: &str) -> Map<String, Value> {
    if raw.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!("tool call {name} carried non-object arguments: {raw}");
            Map::new()
        }
    }
}
