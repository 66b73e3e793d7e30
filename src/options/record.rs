use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Flattened user configuration for the chat client.
///
/// Keys follow the engine's parameter names. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum completion tokens; `-1` means no limit
    #[serde(default)]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Legacy response format, e.g. `text` or `json_object`
    #[serde(default)]
    pub response_format: Option<String>,
    /// Raw reasoning effort; only `low`, `medium` and `high` are forwarded
    #[serde(default)]
    pub reasoning_effort: Option<String>,
    #[serde(default, rename = "baseURL")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub service_tier: Option<String>,
    #[serde(default)]
    pub safety_identifier: Option<String>,
    #[serde(default)]
    pub prompt_cache_key: Option<String>,
    #[serde(default)]
    pub top_logprobs: Option<u32>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Metadata object, usually a JSON string typed into the node
    #[serde(default)]
    pub metadata: Option<Value>,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            frequency_penalty: None,
            presence_penalty: None,
            top_p: None,
            timeout: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            response_format: None,
            reasoning_effort: None,
            base_url: None,
            service_tier: None,
            safety_identifier: None,
            prompt_cache_key: None,
            top_logprobs: None,
            conversation_id: None,
            metadata: None,
        }
    }
}

impl ChatOptions {
    /// Reads an options record from the engine's `options` parameter value.
    ///
    /// A missing or `null` value yields the defaults.
    pub fn from_value(value: Option<Value>) -> Result<Self, crate::error::LLMError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                crate::error::LLMError::InvalidRequest(format!("Invalid options: {e}"))
            }),
        }
    }
}

/// Returns the trimmed value when it is present and non-empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
