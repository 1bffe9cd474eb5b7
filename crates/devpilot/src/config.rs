use std::path::Path;

use devpilot_llm::LlmSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Optional settings file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "devpilot.json";

pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentPreferences {
    /// Skip the confirmation gate for sensitive tools.
    pub auto_execute: bool,
    pub max_iterations: u32,
    pub command_timeout_ms: u64,
    pub max_output_chars: usize,
}

impl Default for AgentPreferences {
    fn default() -> Self {
        Self {
            auto_execute: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

/// Google Custom Search credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
}

impl SearchSettings {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.engine_id.as_deref()) {
            (Some(key), Some(id)) if !key.is_empty() && !id.is_empty() => Some((key, id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub llm: LlmSettings,
    pub preferences: AgentPreferences,
    pub search: SearchSettings,
}

impl AgentConfig {
    /// Defaults, then `devpilot.json` in `workspace_root`, then the process environment.
    pub fn load(workspace_root: &Path) -> CoreResult<Self> {
        Self::load_with(workspace_root, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(workspace_root: &Path, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = workspace_root.join(CONFIG_FILE_NAME);
        let config = if path.is_file() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                CoreError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            let parsed: AgentConfig = serde_json::from_str(&raw).map_err(|e| {
                CoreError::Config(format!("failed to parse {}: {e}", path.display()))
            })?;
            debug!("loaded settings from {}", path.display());
            parsed
        } else {
            AgentConfig::default()
        };
        Ok(config.with_env_overrides(lookup))
    }

    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("DEVPILOT_AUTO_EXECUTE").and_then(|v| parse_bool(&v)) {
            self.preferences.auto_execute = value;
        }
        if let Some(value) = get("DEVPILOT_MAX_ITERATIONS").and_then(|v| v.parse().ok()) {
            self.preferences.max_iterations = value;
        }
        if let Some(value) = get("DEVPILOT_COMMAND_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.preferences.command_timeout_ms = value;
        }
        if let Some(value) = get("DEVPILOT_MAX_OUTPUT_CHARS").and_then(|v| v.parse().ok()) {
            self.preferences.max_output_chars = value;
        }
        if let Some(value) = get("DEVPILOT_GOOGLE_CSE_API_KEY") {
            self.search.api_key = Some(value);
        }
        if let Some(value) = get("DEVPILOT_GOOGLE_CSE_ID") {
            self.search.engine_id = Some(value);
        }
        self.llm = self.llm.with_env_overrides(&lookup);
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
