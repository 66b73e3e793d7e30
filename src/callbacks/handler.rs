use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::chat::ChatMessage;
use crate::error::LLMError;

use super::result::LLMResult;

/// Snapshot of a generation as it starts.
#[derive(Debug, Clone)]
pub struct LLMStart {
    pub run_id: Uuid,
    pub parent_run_id: Option<Uuid>,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Request parameters without the messages
    pub invocation_params: Value,
    pub metadata: Map<String, Value>,
}

/// Receives generation lifecycle events from the chat client.
///
/// Every method defaults to a no-op. Errors returned by a handler abort the
/// invocation that triggered them.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle_llm_start(&self, _start: &LLMStart) -> Result<(), LLMError> {
        Ok(())
    }

    async fn handle_llm_end(
        &self,
        _output: &mut LLMResult,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        Ok(())
    }

    async fn handle_llm_error(
        &self,
        _error: &LLMError,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        Ok(())
    }
}

#[async_trait]
impl<H: CallbackHandler + ?Sized> CallbackHandler for Arc<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn handle_llm_start(&self, start: &LLMStart) -> Result<(), LLMError> {
        (**self).handle_llm_start(start).await
    }

    async fn handle_llm_end(
        &self,
        output: &mut LLMResult,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        (**self).handle_llm_end(output, run_id, parent_run_id).await
    }

    async fn handle_llm_error(
        &self,
        error: &LLMError,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        (**self).handle_llm_error(error, run_id, parent_run_id).await
    }
}

/// Ordered list of handlers attached to one client.
#[derive(Clone, Default)]
pub struct Callbacks {
    handlers: Vec<Arc<dyn CallbackHandler>>,
}

impl Callbacks {
    pub fn new(handlers: Vec<Arc<dyn CallbackHandler>>) -> Self {
        Self { handlers }
    }

    pub fn push(&mut self, handler: Arc<dyn CallbackHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    pub(crate) async fn on_start(&self, start: &LLMStart) -> Result<(), LLMError> {
        for handler in &self.handlers {
            handler.handle_llm_start(start).await?;
        }
        Ok(())
    }

    /// Runs handlers in order; each sees the mutations of the ones before it.
    pub(crate) async fn on_end(
        &self,
        output: &mut LLMResult,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        for handler in &self.handlers {
            handler.handle_llm_end(output, run_id, parent_run_id).await?;
        }
        Ok(())
    }

    pub(crate) async fn on_error(
        &self,
        error: &LLMError,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        for handler in &self.handlers {
            handler.handle_llm_error(error, run_id, parent_run_id).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
