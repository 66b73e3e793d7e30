use std::sync::Arc;

use crate::callbacks::{CallbackHandler, Callbacks, LoggingTracer};
use crate::client::{ChatOpenAI, ChatOpenAIFields, NetworkConfig};
use crate::error::LLMError;
use crate::mapper::{build_direct_fields, build_extra_parameters, format_builtin_tools};

use super::chat_model_builder::{ChatModelBuilder, DEFAULT_NODE_NAME};
use super::helpers;
use super::state::BuilderState;

impl ChatModelBuilder {
    /// Maps the collected options and constructs the traced client.
    pub fn build(self) -> Result<ChatOpenAI, LLMError> {
        self.state.build()
    }
}

impl BuilderState {
    pub(super) fn build(mut self) -> Result<ChatOpenAI, LLMError> {
        helpers::log_builder_state(&self);
        let api_key = helpers::require_api_key(&mut self)?;
        let model = helpers::require_model(&mut self)?;

        let custom_metadata = self.langfuse_context.metadata()?;
        let direct = build_direct_fields(&self.options);
        let model_kwargs = build_extra_parameters(&self.options, self.responses_api)?;
        let tools = if self.responses_api {
            format_builtin_tools(&self.builtin_tools)?
        } else {
            Vec::new()
        };

        let mut handlers: Vec<Arc<dyn CallbackHandler>> = Vec::new();
        if let Some(langfuse) = helpers::langfuse_handler(&mut self, custom_metadata) {
            handlers.push(Arc::new(langfuse));
        }
        let node_name = self
            .node_name
            .take()
            .unwrap_or_else(|| DEFAULT_NODE_NAME.to_string());
        handlers.push(Arc::new(LoggingTracer::new(node_name)));
        handlers.append(&mut self.extra_handlers);

        let fields = ChatOpenAIFields {
            api_key,
            model,
            direct,
            timeout_ms: self.options.timeout,
            max_retries: self.options.max_retries,
            network: NetworkConfig {
                base_url: self.base_url.take(),
                proxy: self.proxy.take(),
                default_headers: std::mem::take(&mut self.headers),
            },
            callbacks: Callbacks::new(handlers),
            metadata: helpers::run_metadata(&self.langfuse_context),
            model_kwargs,
            use_responses_api: self.responses_api,
        };

        let mut model = ChatOpenAI::new(fields)?;
        if !tools.is_empty() {
            log::debug!("attaching {} hosted tool(s)", tools.len());
            model.attach_builtin_tools(tools)?;
        }
        Ok(model)
    }
}
