use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::LLMError;
use crate::options::{non_empty, ChatOptions, ReasoningEffort};

use super::json::parse_embedded_object;

/// Free-form request fields for provider features the client does not model.
///
/// Serialized transparently so it can be flattened into a request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtraParameters(Map<String, Value>);

impl ExtraParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }
}

impl From<Map<String, Value>> for ExtraParameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Builds the extra parameter bag for either invocation mode.
///
/// The Responses API branch and the legacy branch never populate the same
/// keys; reasoning effort is gated the same way in both and only its wire
/// shape differs.
pub fn build_extra_parameters(
    options: &ChatOptions,
    responses_api: bool,
) -> Result<ExtraParameters, LLMError> {
    if responses_api {
        responses_parameters(options)
    } else {
        Ok(legacy_parameters(options))
    }
}

fn reasoning_effort(options: &ChatOptions) -> Option<ReasoningEffort> {
    options
        .reasoning_effort
        .as_deref()
        .and_then(ReasoningEffort::from_option)
}

fn legacy_parameters(options: &ChatOptions) -> ExtraParameters {
    let mut extra = ExtraParameters::new();
    if let Some(format) = non_empty(&options.response_format) {
        extra.insert("response_format", json!({ "type": format }));
    }
    if let Some(effort) = reasoning_effort(options) {
        extra.insert("reasoning_effort", json!(effort.as_str()));
    }
    extra
}

fn responses_parameters(options: &ChatOptions) -> Result<ExtraParameters, LLMError> {
    let mut extra = ExtraParameters::new();
    if let Some(conversation) = non_empty(&options.conversation_id) {
        extra.insert("conversation", json!(conversation));
    }
    if let Some(metadata) = parse_embedded_object("metadata", options.metadata.as_ref())? {
        extra.insert("metadata", Value::Object(metadata));
    }
    if let Some(key) = non_empty(&options.prompt_cache_key) {
        extra.insert("prompt_cache_key", json!(key));
    }
    if let Some(effort) = reasoning_effort(options) {
        extra.insert("reasoning", json!({ "effort": effort.as_str() }));
    }
    if let Some(identifier) = non_empty(&options.safety_identifier) {
        extra.insert("safety_identifier", json!(identifier));
    }
    if let Some(tier) = non_empty(&options.service_tier) {
        extra.insert("service_tier", json!(tier));
    }
    if let Some(top) = options.top_logprobs.filter(|top| *top > 0) {
        extra.insert("top_logprobs", json!(top));
    }
    Ok(extra)
}
