use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SearchSettings;
use crate::error::ToolError;

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_RESULTS: u32 = 5;
const MAX_RESULTS: u32 = 10;
const SEARCH_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Clamp a requested result count to `1..=10`, defaulting to 5.
pub fn result_count(requested: Option<f64>) -> u32 {
    match requested {
        Some(n) if n.is_finite() => (n.round() as i64).clamp(1, MAX_RESULTS as i64) as u32,
        _ => DEFAULT_RESULTS,
    }
}

pub async fn google_search(
    client: &reqwest::Client,
    settings: &SearchSettings,
    query: &str,
    num_results: Option<f64>,
) -> Result<Value, ToolError> {
    let (api_key, engine_id) = settings.credentials().ok_or_else(|| {
        ToolError::collaborator(
            "web search is not configured: set DEVPILOT_GOOGLE_CSE_API_KEY and DEVPILOT_GOOGLE_CSE_ID",
        )
    })?;
    let num = result_count(num_results).to_string();

    let response = client
        .get(GOOGLE_CSE_URL)
        .query(&[
            ("key", api_key),
            ("cx", engine_id),
            ("q", query),
            ("num", num.as_str()),
        ])
        .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| ToolError::collaborator(format!("search request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ToolError::collaborator(format!(
            "search failed with status {status}: {body}"
        )));
    }

    let parsed: SearchResponse = response
        .json()
        .await
        .map_err(|e| ToolError::collaborator(format!("invalid search response: {e}")))?;

    Ok(Value::Array(
        parsed
            .items
            .into_iter()
            .map(|item| {
                json!({
                    "title": item.title,
                    "link": item.link,
                    "snippet": item.snippet,
                })
            })
            .collect(),
    ))
}
