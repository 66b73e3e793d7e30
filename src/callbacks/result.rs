use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chat::Usage;

/// Key under which provider-reported usage lives in `llm_output`.
pub const TOKEN_USAGE_KEY: &str = "tokenUsage";
/// Key under which locally estimated usage lives in `llm_output`.
pub const ESTIMATED_TOKEN_USAGE_KEY: &str = "estimatedTokenUsage";

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<Map<String, Value>>,
}

/// Outcome of a generation as seen by callbacks.
///
/// `llm_output` is loosely typed on purpose: tracing backends look up usage
/// by key name, so the shape has to survive exactly as emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMResult {
    pub generations: Vec<Vec<Generation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_output: Option<Map<String, Value>>,
}

impl LLMResult {
    /// Text of the first generation, if any.
    pub fn text(&self) -> Option<&str> {
        self.generations
            .first()
            .and_then(|candidates| candidates.first())
            .map(|generation| generation.text.as_str())
    }

    pub fn token_usage(&self) -> Option<TokenUsage> {
        self.usage_under(TOKEN_USAGE_KEY)
    }

    pub fn estimated_token_usage(&self) -> Option<TokenUsage> {
        self.usage_under(ESTIMATED_TOKEN_USAGE_KEY)
    }

    fn usage_under(&self, key: &str) -> Option<TokenUsage> {
        let value = self.llm_output.as_ref()?.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }
}

/// Token counts in the camelCase shape callbacks expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<&Usage> for TokenUsage {
    fn from(usage: &Usage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}
