use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::callbacks::{
    Generation, LLMResult, TokenUsage, ESTIMATED_TOKEN_USAGE_KEY, TOKEN_USAGE_KEY,
};
use crate::chat::{ChatMessage, Usage};

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponsesResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub output: Vec<ResponsesOutputItem>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(super) enum ResponsesOutputItem {
    #[serde(rename = "message")]
    Message {
        content: Vec<ResponsesOutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(super) enum ResponsesOutputContent {
    #[serde(rename = "output_text")]
    OutputText { text: String },
    #[serde(other)]
    Other,
}

/// Provider-neutral view of a single completion.
#[derive(Debug, Default)]
pub(super) struct Completion {
    pub text: String,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl From<ChatCompletionResponse> for Completion {
    fn from(response: ChatCompletionResponse) -> Self {
        let first = response.choices.into_iter().next();
        let (text, finish_reason) = match first {
            Some(choice) => (
                choice.message.content.unwrap_or_default(),
                choice.finish_reason,
            ),
            None => (String::new(), None),
        };
        Self {
            text,
            model: response.model,
            finish_reason,
            usage: response.usage,
        }
    }
}

impl From<ResponsesResponse> for Completion {
    fn from(response: ResponsesResponse) -> Self {
        let text = response
            .output
            .iter()
            .filter_map(|item| match item {
                ResponsesOutputItem::Message { content } => Some(content),
                ResponsesOutputItem::Other => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ResponsesOutputContent::OutputText { text } => Some(text.as_str()),
                ResponsesOutputContent::Other => None,
            })
            .collect::<String>();
        Self {
            text,
            model: response.model,
            finish_reason: response.status,
            usage: response.usage,
        }
    }
}

/// Rough token count used when the provider reports no usage.
pub(super) fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count().div_ceil(4);
    u32::try_from(chars).unwrap_or(u32::MAX)
}

impl Completion {
    /// Converts into the callback result, falling back to an estimate for usage.
    pub fn into_result(self, messages: &[ChatMessage]) -> LLMResult {
        let mut llm_output = Map::new();
        match &self.usage {
            Some(usage) => {
                llm_output.insert(TOKEN_USAGE_KEY.to_string(), json!(TokenUsage::from(usage)));
            }
            None => {
                let prompt = messages
                    .iter()
                    .map(|message| estimate_tokens(&message.content))
                    .fold(0u32, u32::saturating_add);
                let estimate = Usage::estimated(prompt, estimate_tokens(&self.text));
                llm_output.insert(
                    ESTIMATED_TOKEN_USAGE_KEY.to_string(),
                    json!(TokenUsage::from(&estimate)),
                );
            }
        }
        if let Some(model) = self.model {
            llm_output.insert("modelName".to_string(), Value::String(model));
        }

        let generation_info = self.finish_reason.map(|reason| {
            let mut info = Map::new();
            info.insert("finishReason".to_string(), Value::String(reason));
            info
        });

        LLMResult {
            generations: vec![vec![Generation {
                text: self.text,
                generation_info,
            }]],
            llm_output: Some(llm_output),
        }
    }
}
