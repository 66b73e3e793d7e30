use serde::Serialize;
use serde_json::{Map, Value};

use crate::chat::{ChatMessage, ChatRole};
use crate::mapper::DirectFields;

/// Request payload for the Chat Completions endpoint.
#[derive(Serialize, Debug)]
pub(super) struct ChatCompletionsRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub stream: bool,
    #[serde(flatten)]
    pub extra_body: Map<String, Value>,
}

/// Request payload for the Responses endpoint.
#[derive(Serialize, Debug)]
pub(super) struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub input: Vec<ResponsesInputMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    pub stream: bool,
    #[serde(flatten)]
    pub extra_body: Map<String, Value>,
}

#[derive(Serialize, Debug)]
pub(super) struct ResponsesInputMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// `-1` (and any other non-positive value) means "let the provider decide".
fn token_limit(direct: &DirectFields) -> Option<i64> {
    direct.max_tokens.filter(|max| *max > 0)
}

pub(super) fn build_chat_completions_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    direct: &DirectFields,
    extra_body: &Map<String, Value>,
) -> ChatCompletionsRequest<'a> {
    ChatCompletionsRequest {
        model,
        messages,
        frequency_penalty: direct.frequency_penalty,
        max_tokens: token_limit(direct),
        presence_penalty: direct.presence_penalty,
        temperature: direct.temperature,
        top_p: direct.top_p,
        stream: false,
        extra_body: extra_body.clone(),
    }
}

/// System messages become `instructions`; the rest is sent as input items.
pub(super) fn build_responses_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    direct: &DirectFields,
    tools: Option<&Value>,
    extra_body: &Map<String, Value>,
) -> ResponsesRequest<'a> {
    let system = messages
        .iter()
        .filter(|message| message.role == ChatRole::System)
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();
    let instructions = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    let input = messages
        .iter()
        .filter(|message| message.role != ChatRole::System)
        .map(|message| ResponsesInputMessage {
            role: message.role.as_str(),
            content: message.content.as_str(),
        })
        .collect();

    ResponsesRequest {
        model,
        input,
        instructions,
        max_output_tokens: token_limit(direct),
        temperature: direct.temperature,
        top_p: direct.top_p,
        tools: tools
            .filter(|tools| tools.as_array().is_some_and(|list| !list.is_empty()))
            .cloned(),
        stream: false,
        extra_body: extra_body.clone(),
    }
}
