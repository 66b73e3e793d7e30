use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};

use crate::callbacks::{LangfuseConfig, LangfuseHandler, TokenUsageNormalizer, DEFAULT_LANGFUSE_BASE_URL};
use crate::error::LLMError;
use crate::options::{non_empty, LangfuseContext};

use super::state::BuilderState;

pub(super) fn log_builder_state(state: &BuilderState) {
    log::debug!(
        "Building chat model. model={:?} responses_api={} web_search={} file_search={} code_interpreter={} temp={} langfuse={}",
        state.model,
        state.responses_api,
        state.builtin_tools.web_search.is_some(),
        state.builtin_tools.file_search.is_some(),
        state.builtin_tools.code_interpreter,
        state.options.temperature,
        state.langfuse_public_key.is_some(),
    );
}

pub(super) fn require_api_key(state: &mut BuilderState) -> Result<SecretString, LLMError> {
    match state.api_key.take() {
        Some(key) if !key.expose_secret().trim().is_empty() => Ok(key),
        _ => Err(LLMError::AuthError(
            "No API key provided for OpenAI".to_string(),
        )),
    }
}

pub(super) fn require_model(state: &mut BuilderState) -> Result<String, LLMError> {
    state
        .model
        .take()
        .filter(|model| !model.trim().is_empty())
        .ok_or_else(|| LLMError::InvalidRequest("No model selected".to_string()))
}

/// Trace attribution keys understood by Langfuse when attached as run metadata.
pub(super) fn run_metadata(context: &LangfuseContext) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("langfuseSessionId".to_string(), json!(context.session_id));
    if let Some(user_id) = context.user_id() {
        metadata.insert("langfuseUserId".to_string(), json!(user_id));
    }
    let tags = context.tags();
    if !tags.is_empty() {
        metadata.insert("langfuseTags".to_string(), json!(tags));
    }
    metadata
}

/// Builds the Langfuse handler, wrapped so estimated usage is still recorded.
///
/// Returns `None` when no project keys were configured.
pub(super) fn langfuse_handler(
    state: &mut BuilderState,
    custom_metadata: Map<String, Value>,
) -> Option<TokenUsageNormalizer<LangfuseHandler>> {
    let public_key = state.langfuse_public_key.take()?;
    let secret_key = state.langfuse_secret_key.take()?;
    let base_url = non_empty(&state.langfuse_base_url)
        .unwrap_or(DEFAULT_LANGFUSE_BASE_URL)
        .to_string();

    let context = &state.langfuse_context;
    let mut config = LangfuseConfig::new(base_url, public_key, secret_key.expose_secret().as_str());
    config.session_id = Some(context.session_id.clone());
    config.user_id = context.user_id().map(str::to_string);
    config.tags = context.tags();
    config.metadata = custom_metadata;

    let handler = match state.langfuse_client.take() {
        Some(client) => LangfuseHandler::with_client(client, config),
        None => LangfuseHandler::new(config),
    };
    Some(TokenUsageNormalizer::new(handler))
}
