use async_trait::async_trait;
use uuid::Uuid;

use crate::error::LLMError;

use super::handler::{CallbackHandler, LLMStart};
use super::result::{LLMResult, ESTIMATED_TOKEN_USAGE_KEY, TOKEN_USAGE_KEY};

/// Wraps a tracing handler so it always finds usage under `tokenUsage`.
///
/// The chat client reports usage it had to estimate under
/// `estimatedTokenUsage`, while tracing backends only read `tokenUsage`.
/// On generation end the estimate is copied over when no reported usage
/// exists; every other event is passed through untouched.
pub struct TokenUsageNormalizer<H> {
    inner: H,
}

impl<H: CallbackHandler> TokenUsageNormalizer<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

/// Copies `estimatedTokenUsage` into `tokenUsage` when only the former exists.
///
/// Returns whether the result was changed.
pub fn normalize_token_usage(output: &mut LLMResult) -> bool {
    let Some(llm_output) = output.llm_output.as_mut() else {
        return false;
    };
    if llm_output.contains_key(TOKEN_USAGE_KEY) {
        return false;
    }
    let Some(estimated) = llm_output.get(ESTIMATED_TOKEN_USAGE_KEY).cloned() else {
        return false;
    };
    llm_output.insert(TOKEN_USAGE_KEY.to_string(), estimated);
    true
}

#[async_trait]
impl<H: CallbackHandler> CallbackHandler for TokenUsageNormalizer<H> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle_llm_start(&self, start: &LLMStart) -> Result<(), LLMError> {
        self.inner.handle_llm_start(start).await
    }

    async fn handle_llm_end(
        &self,
        output: &mut LLMResult,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        if normalize_token_usage(output) {
            log::trace!("{}: copied estimated token usage for run {run_id}", self.name());
        }
        self.inner.handle_llm_end(output, run_id, parent_run_id).await
    }

    async fn handle_llm_error(
        &self,
        error: &LLMError,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        self.inner.handle_llm_error(error, run_id, parent_run_id).await
    }
}
