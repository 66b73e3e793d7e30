use async_trait::async_trait;
use uuid::Uuid;

use crate::error::LLMError;

use super::handler::{CallbackHandler, LLMStart};
use super::result::LLMResult;

/// Engine-side tracer that writes generation events to the `log` facade.
pub struct LoggingTracer {
    node_name: String,
}

impl LoggingTracer {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }
}

#[async_trait]
impl CallbackHandler for LoggingTracer {
    fn name(&self) -> &str {
        "LoggingTracer"
    }

    async fn handle_llm_start(&self, start: &LLMStart) -> Result<(), LLMError> {
        log::info!(
            "[{}] generation started run={} model={} messages={}",
            self.node_name,
            start.run_id,
            start.model,
            start.messages.len()
        );
        Ok(())
    }

    async fn handle_llm_end(
        &self,
        output: &mut LLMResult,
        run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        let (usage, estimated) = match output.token_usage() {
            Some(usage) => (Some(usage), false),
            None => (output.estimated_token_usage(), true),
        };
        match usage {
            Some(usage) => log::info!(
                "[{}] generation finished run={run_id} prompt_tokens={} completion_tokens={} total_tokens={} estimated={estimated}",
                self.node_name,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
            ),
            None => log::info!(
                "[{}] generation finished run={run_id} (no usage reported)",
                self.node_name
            ),
        }
        Ok(())
    }

    async fn handle_llm_error(
        &self,
        error: &LLMError,
        run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        log::error!("[{}] generation failed run={run_id}: {error}", self.node_name);
        Ok(())
    }
}
