use serde::Serialize;

use crate::options::{non_empty, ChatOptions};

/// Constructor fields the chat client accepts directly.
///
/// Only the allow-listed options end up here; everything else in the record is
/// either routed through [`ExtraParameters`](super::ExtraParameters) or dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectFields {
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
    #[serde(skip_serializing_if = "Option::is_none", rename = "baseURL")]
    pub base_url: Option<String>,
}

pub fn build_direct_fields(options: &ChatOptions) -> DirectFields {
    DirectFields {
        frequency_penalty: options.frequency_penalty,
        max_tokens: options.max_tokens,
        presence_penalty: options.presence_penalty,
        temperature: Some(options.temperature),
        top_p: options.top_p,
        base_url: non_empty(&options.base_url).map(str::to_string),
    }
}
