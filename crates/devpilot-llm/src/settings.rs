use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Devpilot, a coding agent working inside the \
user's workspace. You can run terminal commands, read, write, edit and delete files, manage \
directories, search the web, and inspect or commit to git.

Before acting, break the request into small ordered steps and use one tool per step. Later \
steps may depend on the effects of earlier ones, so request tools in the order they must run. \
When a tool returns an error, read it and adapt instead of repeating the same call. Report \
what you did and any problems once the work is finished.";

/// Connection and sampling settings for the chat transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `DEVPILOT_LLM_*` variables (with `OPENAI_*` fallbacks) on top of `self`.
    ///
    /// Empty or unparsable values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(|key| lookup(key)))
                .filter(|value| !value.trim().is_empty())
        };

        if let Some(base_url) = get("DEVPILOT_LLM_BASE_URL", Some("OPENAI_BASE_URL")) {
            self.base_url = base_url;
        }
        if let Some(api_key) = get("DEVPILOT_LLM_API_KEY", Some("OPENAI_API_KEY")) {
            self.api_key = Some(api_key);
        }
        if let Some(model) = get("DEVPILOT_LLM_MODEL", Some("OPENAI_MODEL")) {
            self.model = model;
        }
        if let Some(prompt) = get("DEVPILOT_LLM_SYSTEM_PROMPT", None) {
            self.system_prompt = prompt;
        }
        if let Some(value) = get("DEVPILOT_LLM_TEMPERATURE", None).and_then(|v| v.parse().ok()) {
            self.temperature = value;
        }
        if let Some(value) =
            get("DEVPILOT_LLM_MAX_OUTPUT_TOKENS", None).and_then(|v| v.parse().ok())
        {
            self.max_output_tokens = value;
        }
        if let Some(value) = get("DEVPILOT_LLM_TIMEOUT_SECS", None).and_then(|v| v.parse().ok()) {
            self.timeout_secs = value;
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    /// Copy with the API key masked, safe to log.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = copy.api_key.map(|_| "***".to_string());
        copy
    }
}
